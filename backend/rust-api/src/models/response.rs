use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::question::QuestionRecord;
use super::Stage;

/// Failed attempts after which a question becomes a review candidate.
pub const REVIEW_FAILURE_THRESHOLD: u32 = 3;

/// One answer submission. Append-only; the embedded question snapshot lets
/// failed questions be re-served later without consulting the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: String,
    pub user_id: String,
    pub stage: Stage,
    pub question_hash: String,
    pub question: QuestionRecord,
    pub answer: String,
    pub is_correct: bool,
    pub attempt_number: u32,
    pub difficulty_level: u8,
    pub timestamp: DateTime<Utc>,
}

/// Whether `hash` currently needs review: at least three failed attempts and
/// no correct answer. A single correct answer retires the question for good.
pub fn needs_review(history: &[ResponseRecord], hash: &str) -> bool {
    let mut failures = 0;
    for record in history.iter().filter(|r| r.question_hash == hash) {
        if record.is_correct {
            return false;
        }
        failures += 1;
    }
    failures >= REVIEW_FAILURE_THRESHOLD
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,
    /// Text of the question being answered, exactly as served.
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[validate(length(min = 1, max = 500))]
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub correct: bool,
    pub explanation: String,
    pub attempt_number: u32,
    pub needs_review: bool,
    pub progress_percent: u8,
}
