//! The seam to the external trivia-question provider.

use std::future::Future;

use livequiz_protocol::Question;

/// Errors a question source can report.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The category is not usable for fetching questions.
    #[error("invalid question category: {0}")]
    InvalidCategory(u32),

    /// The provider could not supply questions (transport failure,
    /// non-success status, malformed payload).
    #[error("question provider unavailable: {0}")]
    Unavailable(String),
}

/// Supplies multiple-choice questions for a quiz round.
///
/// This is the only operation in the room layer that may suspend; it runs
/// inside the starting room's actor, so a slow provider stalls that one
/// room's mailbox and nothing else. Implementations must return questions
/// already HTML-entity-decoded, with each `correct_index` placed at a
/// uniformly random position.
pub trait QuestionSource: Send + Sync + 'static {
    /// Fetches `count` questions for `category`, in presentation order.
    fn fetch(
        &self,
        category: u32,
        count: usize,
    ) -> impl Future<Output = Result<Vec<Question>, SourceError>> + Send;
}
