use anyhow::{Context, Result};
use chrono::Utc;
use redis::aio::ConnectionManager;

use crate::metrics::{track_cache_operation, QUIZ_SESSIONS_STARTED_TOTAL};
use crate::models::question::QuestionRecord;
use crate::models::{QuizSession, Stage};

/// Redis-backed quiz session store. Sessions are scoped by (user, stage) and
/// expire with the configured TTL; expiry is what ends a session.
pub struct SessionService {
    redis: ConnectionManager,
    ttl_seconds: i64,
}

impl SessionService {
    pub fn new(redis: ConnectionManager, ttl_seconds: i64) -> Self {
        Self { redis, ttl_seconds }
    }

    fn session_key(user_id: &str, stage: Stage) -> String {
        format!("quiz:session:{}:{}", user_id, stage.as_str())
    }

    pub async fn get(&self, user_id: &str, stage: Stage) -> Result<Option<QuizSession>> {
        let mut conn = self.redis.clone();
        let key = Self::session_key(user_id, stage);

        let raw: Option<String> = redis::cmd("GET")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .context("Failed to load quiz session from Redis")?;

        match raw {
            Some(json) => {
                let session =
                    serde_json::from_str(&json).context("Failed to deserialize quiz session")?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    pub async fn get_or_create(&self, user_id: &str, stage: Stage) -> Result<QuizSession> {
        if let Some(session) = self.get(user_id, stage).await? {
            return Ok(session);
        }

        let now = Utc::now();
        let session = QuizSession {
            user_id: user_id.to_string(),
            stage,
            started_at: now,
            expires_at: now + chrono::Duration::seconds(self.ttl_seconds),
            served: Vec::new(),
        };
        self.store(&session).await?;

        QUIZ_SESSIONS_STARTED_TOTAL
            .with_label_values(&[stage.as_str()])
            .inc();
        tracing::info!("Quiz session started: user={}, stage={}", user_id, stage);

        Ok(session)
    }

    /// Append newly served questions and refresh the TTL.
    pub async fn record_served(
        &self,
        session: &mut QuizSession,
        questions: &[QuestionRecord],
    ) -> Result<()> {
        session.served.extend_from_slice(questions);
        self.store(session).await
    }

    async fn store(&self, session: &QuizSession) -> Result<()> {
        let mut conn = self.redis.clone();
        let key = Self::session_key(&session.user_id, session.stage);
        let json = serde_json::to_string(session).context("Failed to serialize quiz session")?;
        let ttl = self.ttl_seconds;

        track_cache_operation("setex", async {
            redis::cmd("SETEX")
                .arg(&key)
                .arg(ttl)
                .arg(json)
                .query_async::<()>(&mut conn)
                .await
                .context("Failed to save quiz session to Redis")
        })
        .await?;

        Ok(())
    }
}
