//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a room instance.
///
/// Injected through the server builder; tests shrink the windows so a full
/// round runs in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// How many questions to request from the provider per round.
    pub question_count: usize,

    /// How long participants get to answer each question.
    pub answer_window: Duration,

    /// Slack added on top of the answer window before the clock advances.
    /// Answers are accepted for this whole stretch — the visible countdown
    /// ends at `answer_window`, but nothing enforces that boundary.
    pub advance_buffer: Duration,

    /// Command mailbox capacity for the room actor (backpressure bound).
    pub mailbox_size: usize,
}

impl RoomConfig {
    /// The clock cadence: one question per `answer_window + advance_buffer`.
    pub fn tick_interval(&self) -> Duration {
        self.answer_window + self.advance_buffer
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            question_count: 10,
            answer_window: Duration::from_secs(15),
            advance_buffer: Duration::from_secs(1),
            mailbox_size: 64,
        }
    }
}
