//! The event contract at the transport boundary.
//!
//! Clients send [`ClientEvent`]s; the server replies and broadcasts
//! [`ServerEvent`]s. Both are internally tagged (`{"type": "...", ...}`),
//! which keeps the JSON easy to dispatch on in browser clients.

use serde::{Deserialize, Serialize};

use crate::types::{
    ConnectionId, ParticipantInfo, Question, QuestionView, RankingEntry,
    RoomId, RoomSnapshot,
};

/// Events a client may send to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Create a new room and become its host.
    CreateRoom {
        room_id: RoomId,
        name: String,
        user: Option<String>,
        category: u32,
    },

    /// Idempotent upsert of the host's control channel into the room.
    /// `connection` is the identity the client holds from an earlier
    /// exchange — it may differ from the sending socket's identity.
    AdminRejoin {
        room_id: RoomId,
        connection: ConnectionId,
    },

    /// Join an Open room by its code.
    JoinRoom {
        room_id: RoomId,
        name: String,
        user: Option<String>,
    },

    /// Host-only: fetch questions and begin the round.
    StartQuiz { room_id: RoomId },

    /// Record an answer. Never produces a reply, even on failure.
    SubmitAnswer {
        room_id: RoomId,
        question_index: usize,
        selected_option: usize,
    },

    /// Cosmetic notice: tell the rest of the room this participant has
    /// submitted. Carries no scoring semantics.
    AnswerSubmitted {
        room_id: RoomId,
        user_id: Option<String>,
        question_id: u64,
    },
}

/// Error kinds reported on the wire. Validation and lifecycle errors go
/// only to the connection that issued the offending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    RoomNotFound,
    DuplicateRoom,
    RoomAlreadyStarted,
    NotHost,
    InvalidCategory,
    ProviderError,
    MissingField,
}

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Confirmation to the creator: room exists, here's your identity.
    RoomCreated {
        room_id: RoomId,
        connection: ConnectionId,
    },

    /// Current roster and host identity, broadcast after an admin rejoin.
    AdminInfo {
        participants: Vec<ParticipantInfo>,
        host: ConnectionId,
    },

    /// Confirmation to a joiner.
    RoomJoined { room_id: RoomId, name: String },

    /// Notice to the rest of the room that someone joined.
    ParticipantJoined {
        connection: ConnectionId,
        name: String,
    },

    /// Sent to each participant individually when the host starts the
    /// quiz. Carries the full question set, correct indexes included.
    QuizStarted {
        room_id: RoomId,
        host: ConnectionId,
        questions: Vec<Question>,
    },

    /// Room-wide sanitized question list (answers withheld).
    QuestionList { questions: Vec<QuestionView> },

    /// One clock tick: the question everyone should be on now.
    NextQuestion {
        index: usize,
        question: QuestionView,
    },

    /// Transient "X has submitted" notice to the rest of the room.
    UserSubmitted {
        connection: ConnectionId,
        name: String,
        user_id: Option<String>,
        question_id: u64,
    },

    /// The final event ever emitted for a room.
    QuizEnded {
        room: RoomSnapshot,
        winners: Vec<String>,
        rankings: Vec<RankingEntry>,
    },

    /// Sent only to the connection whose request failed.
    Error { kind: ErrorKind, message: String },
}

// =========================================================================
// Tests
// =========================================================================
