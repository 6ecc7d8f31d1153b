use livequiz::{LiveQuizError, LiveQuizServer};
use livequiz_provider::OpenTdbClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), LiveQuizError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("livequiz=info")),
        )
        .init();

    let addr = std::env::var("LIVEQUIZ_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let server = LiveQuizServer::<OpenTdbClient>::builder()
        .bind(&addr)
        .build(OpenTdbClient::new())
        .await?;

    server.run().await
}
