use anyhow::{Context, Result};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Database;
use uuid::Uuid;

use crate::metrics::{track_db_operation, ANSWERS_SUBMITTED_TOTAL};
use crate::models::question::QuestionRecord;
use crate::models::response::{self, ResponseRecord, SubmitAnswerResponse};
use crate::models::Stage;
use crate::services::badge_service;
use crate::utils::retry::{retry_async_with_config, RetryConfig};

const COLLECTION: &str = "response_records";

/// Grades answers against served snapshots and maintains the append-only
/// response log — the single source of truth for progress and selection.
pub struct AnswerService {
    mongo: Database,
}

impl AnswerService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    /// All records for (user, stage), oldest first. Selection, difficulty and
    /// badge progress all fold over this one load.
    pub async fn load_history(&self, user_id: &str, stage: Stage) -> Result<Vec<ResponseRecord>> {
        let collection = self.mongo.collection::<ResponseRecord>(COLLECTION);
        let filter = doc! { "user_id": user_id, "stage": stage.as_str() };

        let records: Vec<ResponseRecord> = track_db_operation("find", COLLECTION, async {
            let cursor = collection
                .find(filter)
                .sort(doc! { "timestamp": 1 })
                .await
                .context("Failed to query response history")?;
            cursor
                .try_collect()
                .await
                .context("Failed to read response history")
        })
        .await?;

        Ok(records)
    }

    /// Grade an answer against the snapshot served in the current session and
    /// append the result to the response log.
    pub async fn submit_answer(
        &self,
        user_id: &str,
        stage: Stage,
        question: &QuestionRecord,
        answer: &str,
    ) -> Result<SubmitAnswerResponse> {
        let history = self.load_history(user_id, stage).await?;

        let hash = question.hash();
        let is_correct = answer.trim() == question.correct_answer.trim();
        let attempt_number = history.iter().filter(|r| r.question_hash == hash).count() as u32 + 1;

        let record = ResponseRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            stage,
            question_hash: hash.clone(),
            question: question.clone(),
            answer: answer.to_string(),
            is_correct,
            attempt_number,
            difficulty_level: question.difficulty_level,
            timestamp: Utc::now(),
        };

        self.save_record(&record).await?;

        let correct_label = if is_correct { "true" } else { "false" };
        ANSWERS_SUBMITTED_TOTAL
            .with_label_values(&[correct_label])
            .inc();

        // Fold the fresh record into the loaded history so the review flag
        // and progress reflect this submission.
        let mut all = history;
        all.push(record);
        let needs_review = response::needs_review(&all, &hash);
        let progress = badge_service::build_progress(user_id, stage, &all, false);

        tracing::info!(
            "Answer recorded: user={}, stage={}, correct={}, attempt={}",
            user_id,
            stage,
            is_correct,
            attempt_number
        );

        Ok(SubmitAnswerResponse {
            correct: is_correct,
            explanation: if is_correct {
                question.correct_reason.clone()
            } else {
                question.incorrect_reason.clone()
            },
            attempt_number,
            needs_review,
            progress_percent: progress.progress_percent,
        })
    }

    async fn save_record(&self, record: &ResponseRecord) -> Result<()> {
        let collection = self.mongo.collection::<ResponseRecord>(COLLECTION);

        track_db_operation("insert", COLLECTION, async {
            retry_async_with_config(RetryConfig::persistent(), || async {
                collection.insert_one(record).await.map(|_| ())
            })
            .await
            .context("Failed to save response record")
        })
        .await?;

        Ok(())
    }
}
