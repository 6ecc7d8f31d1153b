//! Live quiz room orchestration.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its quiz
//! state, participant roster, and question clock. All transport events and
//! clock ticks for one room flow through a single mailbox, processed
//! strictly in arrival order — that is the whole concurrency discipline.
//! Rooms share nothing and run fully in parallel.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — owns the set of active rooms, keyed by room id
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`QuizRoom`] — the per-room state (phase, questions, participants)
//! - [`QuestionSource`] — the seam to the external trivia provider
//! - [`RoomConfig`] — question count, answer window, advance buffer

mod config;
mod error;
pub mod ranking;
mod registry;
mod room;
pub mod scoring;
mod source;
mod state;

pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{ParticipantSender, RoomHandle};
pub use source::{QuestionSource, SourceError};
pub use state::{AnswerRecord, Participant, QuizRoom, Role};
