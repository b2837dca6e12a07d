use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Where a question in a served set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Generated,
    Predefined,
    Review,
}

impl QuestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionSource::Generated => "generated",
            QuestionSource::Predefined => "predefined",
            QuestionSource::Review => "review",
        }
    }
}

/// A quiz question as selected for a user. Immutable once served; grading
/// always runs against the exact snapshot the user saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub correct_reason: String,
    pub incorrect_reason: String,
    pub difficulty_level: u8,
    pub source: QuestionSource,
}

impl QuestionRecord {
    pub fn hash(&self) -> String {
        question_hash(&self.text)
    }
}

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Content hash used for de-duplication. Case, punctuation and whitespace
/// variations of the same question text produce the same hash.
pub fn question_hash(text: &str) -> String {
    let lowered = text.to_lowercase();
    let normalized = NON_ALPHANUMERIC.replace_all(&lowered, " ");
    let mut hasher = Sha256::new();
    hasher.update(normalized.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Wire shape of a question. The key set is a contract with the web client
/// and must not grow or shrink.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub correct_reason: String,
    pub incorrect_reason: String,
}

impl From<QuestionRecord> for ApiQuestion {
    fn from(record: QuestionRecord) -> Self {
        Self {
            question: record.text,
            options: record.options,
            answer: record.correct_answer,
            correct_reason: record.correct_reason,
            incorrect_reason: record.incorrect_reason,
        }
    }
}
