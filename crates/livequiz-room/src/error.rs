//! Error types for the room layer.

use livequiz_protocol::RoomId;

/// Errors that can occur during room operations.
///
/// These are reported only to the connection that issued the offending
/// request — never broadcast to the room, and never allowed to spill from
/// one room into another.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist in the registry.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// A room with this id already exists.
    #[error("room {0} already exists")]
    Duplicate(RoomId),

    /// The quiz already started (or ended) — joins and a second start are
    /// rejected.
    #[error("quiz in room {0} already started")]
    AlreadyStarted(RoomId),

    /// Someone other than the host tried a host-only operation.
    #[error("only the host may start the quiz in room {0}")]
    NotHost(RoomId),

    /// The room's quiz category can't be used to fetch questions.
    #[error("invalid quiz category: {0}")]
    InvalidCategory(u32),

    /// The external question provider failed; the room stays Open so the
    /// host may retry.
    #[error("failed to fetch questions: {0}")]
    Provider(String),

    /// A required request field was missing or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The room's command mailbox is gone (actor shut down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
