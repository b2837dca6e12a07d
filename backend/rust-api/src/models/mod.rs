use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use self::question::{ApiQuestion, QuestionRecord};

pub mod badge;
pub mod question;
pub mod response;

/// Maternal-health education stage. Appears in URLs, Mongo documents and
/// Redis keys, always in its lowercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preconception,
    Prenatal,
    Birth,
    Postnatal,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Preconception,
        Stage::Prenatal,
        Stage::Birth,
        Stage::Postnatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preconception => "preconception",
            Stage::Prenatal => "prenatal",
            Stage::Birth => "birth",
            Stage::Postnatal => "postnatal",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-(user, stage) quiz session, stored in Redis with a TTL. Tracks every
/// question served so repeats can be filtered and answers graded against the
/// snapshot the user actually saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    pub user_id: String,
    pub stage: Stage,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub served: Vec<QuestionRecord>,
}

impl QuizSession {
    pub fn served_hashes(&self) -> HashSet<String> {
        self.served.iter().map(|q| q.hash()).collect()
    }

    pub fn find_served(&self, hash: &str) -> Option<&QuestionRecord> {
        self.served.iter().find(|q| q.hash() == hash)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuestionSetRequest {
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,
    /// How many questions to return.
    #[validate(range(min = 1, max = 20))]
    #[serde(default = "default_question_count")]
    pub count: u32,
}

fn default_question_count() -> u32 {
    5
}

#[derive(Debug, Serialize)]
pub struct QuestionSetResponse {
    pub stage: Stage,
    pub difficulty_level: u8,
    pub questions: Vec<ApiQuestion>,
}
