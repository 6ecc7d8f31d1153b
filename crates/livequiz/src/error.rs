//! Unified error type for the server crate.

use livequiz_protocol::ProtocolError;
use livequiz_room::RoomError;

use crate::net::NetError;

/// Top-level error wrapping the layer-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum LiveQuizError {
    /// Socket-level failure (bind, accept, upgrade, send).
    #[error(transparent)]
    Net(#[from] NetError),

    /// Encode/decode failure at the event boundary.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Room lifecycle failure.
    #[error(transparent)]
    Room(#[from] RoomError),
}
