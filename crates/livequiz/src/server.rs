//! `LiveQuizServer` builder and accept loop.
//!
//! Ties the layers together: socket → protocol → registry → room actors.

use std::sync::Arc;

use livequiz_protocol::JsonCodec;
use livequiz_room::{QuestionSource, RoomConfig, RoomRegistry};
use tokio::sync::Mutex;

use crate::LiveQuizError;
use crate::handler::handle_connection;
use crate::net::WsListener;

/// Shared server state passed to each connection handler task.
///
/// The registry lock is held only for create/lookup; everything room-side
/// happens through the handles, outside the lock.
pub(crate) struct ServerState<S: QuestionSource> {
    pub(crate) registry: Mutex<RoomRegistry<S>>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a quiz server.
///
/// # Example
///
/// ```rust,ignore
/// use livequiz::LiveQuizServer;
/// use livequiz_provider::OpenTdbClient;
///
/// let server = LiveQuizServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(OpenTdbClient::new())
///     .await?;
/// server.run().await
/// ```
pub struct LiveQuizServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl LiveQuizServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener and builds the server around `source`.
    pub async fn build<S: QuestionSource>(
        self,
        source: S,
    ) -> Result<LiveQuizServer<S>, LiveQuizError> {
        let listener = WsListener::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new(self.room_config, Arc::new(source))),
            codec: JsonCodec,
        });

        Ok(LiveQuizServer { listener, state })
    }
}

impl Default for LiveQuizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running quiz server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct LiveQuizServer<S: QuestionSource> {
    listener: WsListener,
    state: Arc<ServerState<S>>,
}

impl<S: QuestionSource> LiveQuizServer<S> {
    pub fn builder() -> LiveQuizServerBuilder {
        LiveQuizServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop. Each connection gets its own handler task;
    /// runs until the process is terminated.
    pub async fn run(self) -> Result<(), LiveQuizError> {
        tracing::info!("livequiz server running");

        loop {
            match self.listener.accept().await {
                Ok((conn_id, ws)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn_id, ws, state).await {
                            tracing::debug!(conn = %conn_id, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
