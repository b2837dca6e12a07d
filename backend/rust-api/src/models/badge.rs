use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Stage;

/// Snapshot of a user's progress towards a stage badge. Always recomputed
/// from response history; never stored as a source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeProgress {
    pub user_id: String,
    pub stage: Stage,
    pub unique_attempt_count: u32,
    pub correct_count: u32,
    pub progress_percent: u8,
    pub claimed: bool,
}

/// Persistent record of a claimed badge. The `_id` of `"{user_id}:{stage}"`
/// turns concurrent double claims into a duplicate-key error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeClaim {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub stage: Stage,
    pub claimed_at: DateTime<Utc>,
}

impl BadgeClaim {
    pub fn claim_id(user_id: &str, stage: Stage) -> String {
        format!("{}:{}", user_id, stage.as_str())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClaimBadgeRequest {
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimBadgeResponse {
    pub claimed: bool,
    pub progress_percent: u8,
    pub message: String,
}
