//! Question source backed by the Open Trivia Database (opentdb.com).

use livequiz_protocol::Question;
use livequiz_room::{QuestionSource, SourceError};
use rand::Rng;
use serde::Deserialize;

use crate::entities::decode_html_entities;

const DEFAULT_BASE_URL: &str = "https://opentdb.com/api.php";

/// Fetches multiple-choice questions from the Open Trivia Database.
///
/// The API interleaving is fixed here: the correct answer arrives in its
/// own field and is spliced into the incorrect answers at a random index,
/// so option order never leaks the answer.
#[derive(Debug, Clone)]
pub struct OpenTdbClient {
    http: reqwest::Client,
    base_url: String,
}

/// Top-level OpenTDB response. `response_code` 0 means success; any other
/// value is a provider-side rejection (no results, bad parameter, ...).
#[derive(Debug, Deserialize)]
struct ApiResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<ApiQuestion>,
}

#[derive(Debug, Deserialize)]
struct ApiQuestion {
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl OpenTdbClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Points the client at a different endpoint. Tests aim this at a
    /// local stub server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenTdbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionSource for OpenTdbClient {
    async fn fetch(&self, category: u32, count: usize) -> Result<Vec<Question>, SourceError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("amount", count.to_string()),
                ("category", category.to_string()),
                ("type", "multiple".to_string()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        if body.response_code != 0 {
            tracing::warn!(category, code = body.response_code, "provider rejected request");
            return Err(SourceError::Unavailable(format!(
                "provider response code {}",
                body.response_code
            )));
        }

        tracing::debug!(category, questions = body.results.len(), "questions fetched");

        let mut rng = rand::rng();
        Ok(body
            .results
            .into_iter()
            .map(|q| into_question(q, &mut rng))
            .collect())
    }
}

/// Converts one API question into the wire shape: entities decoded and the
/// correct answer placed at a random position among the options.
fn into_question(api: ApiQuestion, rng: &mut impl Rng) -> Question {
    let mut options: Vec<String> = api
        .incorrect_answers
        .into_iter()
        .map(|a| decode_html_entities(&a))
        .collect();

    let correct_index = rng.random_range(0..=options.len());
    options.insert(correct_index, decode_html_entities(&api.correct_answer));

    Question {
        text: decode_html_entities(&api.question),
        options,
        correct_index,
    }
}
