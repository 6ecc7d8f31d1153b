//! Core data types carried by the wire protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for one transport connection.
///
/// Assigned by the server when a socket is accepted. The room layer keys
/// participants by this — a participant is owned by its transport session,
/// the room only holds the identity.
///
/// `#[serde(transparent)]` makes `ConnectionId(42)` serialize as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A room identifier. Externally supplied by the creating client (it's the
/// join code players type in), globally unique within the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is usable as a registry key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Room lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room.
///
/// Transitions only move forward, never backward:
///
/// ```text
/// Open → InProgress → Ended
/// ```
///
/// - **Open**: room exists, accepting joins, quiz not started.
/// - **InProgress**: question clock is running; joining is rejected.
/// - **Ended**: final tick fired, rankings broadcast. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    Open,
    InProgress,
    Ended,
}

impl RoomPhase {
    /// Returns `true` if the room is accepting new participants.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` if the quiz is actively running.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// The next phase in the strict forward order, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Open => Some(Self::InProgress),
            Self::InProgress => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// A multiple-choice question. Immutable once fetched for a room.
///
/// Text and options are already HTML-entity-decoded by the provider layer;
/// nothing downstream needs to know the upstream encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// Ordered option strings; the correct answer sits at `correct_index`.
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    /// The sanitized form of this question — answer withheld.
    pub fn view(&self) -> QuestionView {
        QuestionView {
            text: self.text.clone(),
            options: self.options.clone(),
        }
    }
}

/// A question as broadcast to the room: text and options, no answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
}

// ---------------------------------------------------------------------------
// Snapshots and standings
// ---------------------------------------------------------------------------

/// One participant as seen in rosters and end-of-quiz snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub connection: ConnectionId,
    pub name: String,
    /// External user id, when the client supplied one at join.
    pub user: Option<String>,
    pub is_host: bool,
    pub score: u32,
    /// `false` once the transport session dropped. Disconnected
    /// participants are never removed — they stay in the standings.
    pub connected: bool,
    /// Join time, milliseconds since the Unix epoch.
    pub joined_at_ms: u64,
}

/// A point-in-time view of a room, broadcast with the completion event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub host: ConnectionId,
    pub host_name: String,
    pub category: u32,
    pub phase: RoomPhase,
    pub current_question_index: usize,
    pub question_count: usize,
    /// Ordered by join sequence, earliest first.
    pub participants: Vec<ParticipantInfo>,
}

/// Rank-based result label for the top three standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

/// One row of the final standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub connection: ConnectionId,
    pub name: String,
    pub user: Option<String>,
    pub score: u32,
    /// Gold/silver/bronze for ranks 0/1/2, `None` below that.
    pub medal: Option<Medal>,
}

// =========================================================================
// Tests
// =========================================================================
