use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::GENERATOR_REQUESTS_TOTAL;
use crate::models::question::{QuestionRecord, QuestionSource};
use crate::models::Stage;

const GENERATOR_TIMEOUT_SECS: u64 = 5;

/// Every quiz question carries exactly three answer options.
pub const OPTIONS_PER_QUESTION: usize = 3;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("question generator disabled via GENERATOR_ENABLED=0")]
    Disabled,
    #[error("question generator request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("question generator returned status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Serialize)]
struct GenerateQuestionsRequest<'a> {
    stage: &'a str,
    difficulty_level: u8,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateQuestionsResponse {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
    #[serde(default)]
    correct_reason: String,
    #[serde(default)]
    incorrect_reason: String,
}

/// HTTP client for the AI question generator. The provider is an external
/// collaborator: callers must treat every error as "no generated pool" and
/// fall back to cached or predefined questions.
pub struct GeneratorClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeneratorClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    pub fn enabled() -> bool {
        std::env::var("GENERATOR_ENABLED").unwrap_or_else(|_| "1".to_string()) != "0"
    }

    /// Fetch a pool of generated questions for (stage, level). Individual
    /// malformed entries are dropped; a fully malformed payload yields an
    /// empty pool rather than an error.
    pub async fn fetch(
        &self,
        stage: Stage,
        difficulty_level: u8,
        count: u32,
    ) -> Result<Vec<QuestionRecord>, GeneratorError> {
        if !Self::enabled() {
            return Err(GeneratorError::Disabled);
        }

        let url = format!("{}/v1/questions", self.base_url);
        let payload = GenerateQuestionsRequest {
            stage: stage.as_str(),
            difficulty_level,
            count,
        };

        tracing::debug!(
            "Calling question generator: {} with stage={}, level={}, count={}",
            url,
            stage,
            difficulty_level,
            count
        );

        let mut request = self
            .client
            .post(&url)
            .json(&payload)
            .timeout(std::time::Duration::from_secs(GENERATOR_TIMEOUT_SECS));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                GENERATOR_REQUESTS_TOTAL.with_label_values(&["error"]).inc();
                return Err(GeneratorError::Request(e));
            }
        };

        if !response.status().is_success() {
            GENERATOR_REQUESTS_TOTAL.with_label_values(&["error"]).inc();
            return Err(GeneratorError::Status(response.status()));
        }

        let body: GenerateQuestionsResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Discarding malformed generator payload: {}", e);
                GENERATOR_REQUESTS_TOTAL
                    .with_label_values(&["malformed"])
                    .inc();
                return Ok(Vec::new());
            }
        };

        GENERATOR_REQUESTS_TOTAL
            .with_label_values(&["success"])
            .inc();

        let pool = sanitize_generated(body.questions, difficulty_level);
        tracing::info!(
            "Generated {} questions for stage={}, level={}",
            pool.len(),
            stage,
            difficulty_level
        );
        Ok(pool)
    }
}

/// Drop generated entries that violate the question contract: empty text,
/// wrong option count, or an answer that is not one of the options.
fn sanitize_generated(raw: Vec<GeneratedQuestion>, difficulty_level: u8) -> Vec<QuestionRecord> {
    raw.into_iter()
        .filter_map(|q| {
            let answer_listed = q.options.iter().any(|o| o.trim() == q.answer.trim());
            if q.question.trim().is_empty()
                || q.options.len() != OPTIONS_PER_QUESTION
                || !answer_listed
            {
                tracing::warn!("Dropping invalid generated question: {:?}", q.question);
                return None;
            }
            Some(QuestionRecord {
                text: q.question,
                options: q.options,
                correct_answer: q.answer,
                correct_reason: q.correct_reason,
                incorrect_reason: q.incorrect_reason,
                difficulty_level,
                source: QuestionSource::Generated,
            })
        })
        .collect()
}
