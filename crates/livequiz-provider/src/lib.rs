//! Trivia question providers.
//!
//! Home of the production [`QuestionSource`](livequiz_room::QuestionSource)
//! implementation, backed by the Open Trivia Database.

mod entities;
mod opentdb;

pub use entities::decode_html_entities;
pub use opentdb::OpenTdbClient;
