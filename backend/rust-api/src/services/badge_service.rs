use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use mongodb::bson::doc;
use mongodb::Database;

use crate::metrics::{track_db_operation, BADGES_CLAIMED_TOTAL};
use crate::models::badge::{BadgeClaim, BadgeProgress, ClaimBadgeResponse};
use crate::models::response::ResponseRecord;
use crate::models::Stage;
use crate::services::answer_service::AnswerService;

const CLAIMS_COLLECTION: &str = "badge_claims";

/// Unique questions a user must attempt before a stage badge unlocks.
pub const ATTEMPT_THRESHOLD: u32 = 3;
/// Overall accuracy required before a stage badge unlocks.
pub const ACCURACY_THRESHOLD: f64 = 0.8;

/// Derives badge progress from response history and records claims. The
/// history is authoritative; a progress figure is never stored and re-read.
pub struct BadgeService {
    mongo: Database,
}

impl BadgeService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    pub async fn progress(&self, user_id: &str, stage: Stage) -> Result<BadgeProgress> {
        let history = AnswerService::new(self.mongo.clone())
            .load_history(user_id, stage)
            .await?;
        let claimed = self.find_claim(user_id, stage).await?.is_some();
        Ok(build_progress(user_id, stage, &history, claimed))
    }

    pub async fn claim(&self, user_id: &str, stage: Stage) -> Result<ClaimBadgeResponse> {
        // Recompute from history at claim time; cached progress is never
        // trusted here.
        let history = AnswerService::new(self.mongo.clone())
            .load_history(user_id, stage)
            .await?;
        let progress = build_progress(user_id, stage, &history, false);

        if progress.progress_percent < 100 {
            anyhow::bail!(
                "Badge not yet earned: progress is {}%",
                progress.progress_percent
            );
        }
        if self.find_claim(user_id, stage).await?.is_some() {
            anyhow::bail!("Badge already claimed");
        }

        let claim = BadgeClaim {
            id: BadgeClaim::claim_id(user_id, stage),
            user_id: user_id.to_string(),
            stage,
            claimed_at: Utc::now(),
        };

        let collection = self.mongo.collection::<BadgeClaim>(CLAIMS_COLLECTION);
        let inserted = track_db_operation("insert", CLAIMS_COLLECTION, async {
            collection
                .insert_one(&claim)
                .await
                .map(|_| ())
                .map_err(|e: mongodb::error::Error| anyhow::anyhow!(e))
        })
        .await;

        if let Err(e) = inserted {
            // A duplicate key means a concurrent claim won the race.
            if e.to_string().contains("E11000") {
                anyhow::bail!("Badge already claimed");
            }
            return Err(e);
        }

        BADGES_CLAIMED_TOTAL
            .with_label_values(&[stage.as_str()])
            .inc();
        tracing::info!("Badge claimed: user={}, stage={}", user_id, stage);

        Ok(ClaimBadgeResponse {
            claimed: true,
            progress_percent: 100,
            message: format!("{} badge unlocked", stage),
        })
    }

    async fn find_claim(&self, user_id: &str, stage: Stage) -> Result<Option<BadgeClaim>> {
        let collection = self.mongo.collection::<BadgeClaim>(CLAIMS_COLLECTION);
        let filter = doc! { "_id": BadgeClaim::claim_id(user_id, stage) };

        track_db_operation("find", CLAIMS_COLLECTION, async {
            collection
                .find_one(filter)
                .await
                .context("Failed to query badge claims")
        })
        .await
    }
}

/// Fold response history into a progress snapshot.
pub(crate) fn build_progress(
    user_id: &str,
    stage: Stage,
    history: &[ResponseRecord],
    claimed: bool,
) -> BadgeProgress {
    let unique: HashSet<&str> = history.iter().map(|r| r.question_hash.as_str()).collect();
    let unique_attempt_count = unique.len() as u32;
    let correct_count = history.iter().filter(|r| r.is_correct).count() as u32;

    BadgeProgress {
        user_id: user_id.to_string(),
        stage,
        unique_attempt_count,
        correct_count,
        progress_percent: progress_percent(unique_attempt_count, correct_count, history.len() as u32),
        claimed,
    }
}

/// Blend of attempt-count ratio and accuracy ratio against the fixed
/// thresholds. 100 only when both thresholds are met; partial scores are
/// capped at 99 so the badge never unlocks early.
pub(crate) fn progress_percent(unique_attempts: u32, correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }

    let accuracy = correct as f64 / total as f64;
    if unique_attempts >= ATTEMPT_THRESHOLD && accuracy >= ACCURACY_THRESHOLD {
        return 100;
    }

    let attempt_ratio = (unique_attempts as f64 / ATTEMPT_THRESHOLD as f64).min(1.0);
    let accuracy_ratio = (accuracy / ACCURACY_THRESHOLD).min(1.0);
    ((50.0 * attempt_ratio + 50.0 * accuracy_ratio).round() as u8).min(99)
}
