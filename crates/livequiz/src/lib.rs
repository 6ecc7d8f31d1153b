//! # LiveQuiz
//!
//! A live multiplayer quiz server over WebSockets.
//!
//! A host creates a room, participants join by room code, and when the
//! host starts the quiz the server fetches trivia questions and drives the
//! whole room through them on a fixed clock, scoring answers and
//! broadcasting the final standings.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use livequiz::LiveQuizServer;
//! use livequiz_provider::OpenTdbClient;
//!
//! # async fn run() -> Result<(), livequiz::LiveQuizError> {
//! let server = LiveQuizServer::<OpenTdbClient>::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(OpenTdbClient::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod net;
mod server;

pub use error::LiveQuizError;
pub use net::NetError;
pub use server::{LiveQuizServer, LiveQuizServerBuilder};

// Re-exports so embedders only need this crate.
pub use livequiz_protocol::{ClientEvent, ErrorKind, ServerEvent};
pub use livequiz_room::{QuestionSource, RoomConfig, SourceError};
