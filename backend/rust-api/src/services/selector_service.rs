use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;

use crate::metrics::QUESTIONS_SERVED_TOTAL;
use crate::models::question::{QuestionRecord, QuestionSource};
use crate::models::response::{self, ResponseRecord};
use crate::models::Stage;
use crate::services::answer_service::AnswerService;
use crate::services::cache::QuestionCache;
use crate::services::generator::{GeneratorClient, GeneratorError};
use crate::services::question_bank;
use crate::services::session_service::SessionService;

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 3;

const PROMOTE_ACCURACY: f64 = 0.8;
const DEMOTE_ACCURACY: f64 = 0.4;
const DIFFICULTY_WINDOW_DAYS: i64 = 14;

/// Pool size requested from the generator on a cache miss.
const GENERATED_POOL_SIZE: u32 = 20;

/// Builds de-duplicated question sets from the question bank and the user's
/// response history, and derives the difficulty level for the set.
pub struct SelectorService {
    answers: AnswerService,
    sessions: SessionService,
    generator: GeneratorClient,
    cache: Arc<QuestionCache>,
}

impl SelectorService {
    pub fn new(
        answers: AnswerService,
        sessions: SessionService,
        generator: GeneratorClient,
        cache: Arc<QuestionCache>,
    ) -> Self {
        Self {
            answers,
            sessions,
            generator,
            cache,
        }
    }

    /// Select up to `desired` questions for (user, stage). No question in the
    /// result repeats a hash already served in the current session; the set
    /// is shuffled before it is returned.
    pub async fn select_questions(
        &self,
        user_id: &str,
        stage: Stage,
        desired: usize,
    ) -> Result<(u8, Vec<QuestionRecord>)> {
        let history = self.answers.load_history(user_id, stage).await?;
        let level = estimate_difficulty(&history, Utc::now());

        let mut session = self.sessions.get_or_create(user_id, stage).await?;
        let session_seen = session.served_hashes();
        let history_seen = seen_hashes(&history);

        let fresh = self.generated_pool(stage, level).await;
        let mixed = self.adjacent_pools(stage, level);
        let review = review_candidates(&history);
        let predefined = question_bank::predefined_pool(stage);

        let set = assemble_set(
            desired,
            &session_seen,
            &history_seen,
            &fresh,
            &review,
            &mixed,
            &predefined,
        );

        for question in &set {
            QUESTIONS_SERVED_TOTAL
                .with_label_values(&[question.source.as_str()])
                .inc();
        }

        self.sessions.record_served(&mut session, &set).await?;

        tracing::info!(
            "Question set built: user={}, stage={}, level={}, requested={}, served={}",
            user_id,
            stage,
            level,
            desired,
            set.len()
        );

        Ok((level, set))
    }

    /// Generated pool for the user's level: cache first, then a single
    /// provider call. Any provider failure degrades to an empty pool.
    async fn generated_pool(&self, stage: Stage, level: u8) -> Vec<QuestionRecord> {
        if let Some(pool) = self.cache.get(stage, level) {
            return pool;
        }

        match self.generator.fetch(stage, level, GENERATED_POOL_SIZE).await {
            Ok(pool) => {
                self.cache.put(stage, level, pool.clone());
                pool
            }
            Err(GeneratorError::Disabled) => {
                tracing::debug!("Question generator disabled; using fallback pools");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    "Question generator unavailable ({}), falling back to cached and predefined pools",
                    e
                );
                Vec::new()
            }
        }
    }

    /// Cached pools at the adjacent difficulty levels. Cache-only: mixing
    /// never triggers extra provider traffic.
    fn adjacent_pools(&self, stage: Stage, level: u8) -> Vec<QuestionRecord> {
        let mut mixed = Vec::new();
        for adjacent in [level.saturating_sub(1), level + 1] {
            if adjacent == level || !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&adjacent) {
                continue;
            }
            if let Some(pool) = self.cache.get(stage, adjacent) {
                mixed.extend(pool);
            }
        }
        mixed
    }
}

fn seen_hashes(history: &[ResponseRecord]) -> HashSet<String> {
    history.iter().map(|r| r.question_hash.clone()).collect()
}

/// Difficulty level for the next set, from the last 14 days of history.
/// No recent records means level 1.
pub(crate) fn estimate_difficulty(history: &[ResponseRecord], now: DateTime<Utc>) -> u8 {
    let cutoff = now - Duration::days(DIFFICULTY_WINDOW_DAYS);
    let recent: Vec<&ResponseRecord> = history.iter().filter(|r| r.timestamp >= cutoff).collect();

    let Some(latest) = recent.last() else {
        return MIN_DIFFICULTY;
    };
    let current = latest.difficulty_level.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);

    let correct = recent.iter().filter(|r| r.is_correct).count();
    let accuracy = correct as f64 / recent.len() as f64;

    if accuracy >= PROMOTE_ACCURACY {
        (current + 1).min(MAX_DIFFICULTY)
    } else if accuracy <= DEMOTE_ACCURACY {
        (current - 1).max(MIN_DIFFICULTY)
    } else {
        current
    }
}

/// Questions the user failed at least three times and never answered
/// correctly, rebuilt from their latest served snapshot.
pub(crate) fn review_candidates(history: &[ResponseRecord]) -> Vec<QuestionRecord> {
    let mut latest: HashMap<&str, &QuestionRecord> = HashMap::new();
    for record in history {
        latest.insert(record.question_hash.as_str(), &record.question);
    }

    let mut hashes: Vec<&str> = latest
        .keys()
        .copied()
        .filter(|hash| response::needs_review(history, hash))
        .collect();
    hashes.sort_unstable();

    hashes
        .into_iter()
        .map(|hash| {
            let mut question = latest[hash].clone();
            question.source = QuestionSource::Review;
            question
        })
        .collect()
}

/// Fill `picked` from `pool` up to `limit` total questions, skipping hashes
/// already used and, optionally, hashes in `exclude`.
fn fill(
    picked: &mut Vec<QuestionRecord>,
    used: &mut HashSet<String>,
    pool: &[QuestionRecord],
    limit: usize,
    exclude: Option<&HashSet<String>>,
) {
    for question in pool {
        if picked.len() >= limit {
            break;
        }
        let hash = question.hash();
        if used.contains(&hash) {
            continue;
        }
        if let Some(seen) = exclude {
            if seen.contains(&hash) {
                continue;
            }
        }
        used.insert(hash);
        picked.push(question.clone());
    }
}

/// Assemble the final set in priority order, then shuffle. The session seen
/// set is a hard exclusion; the historical seen set only demotes material to
/// the last-resort passes.
pub(crate) fn assemble_set(
    desired: usize,
    session_seen: &HashSet<String>,
    history_seen: &HashSet<String>,
    fresh: &[QuestionRecord],
    review: &[QuestionRecord],
    mixed: &[QuestionRecord],
    predefined: &[QuestionRecord],
) -> Vec<QuestionRecord> {
    let mut picked: Vec<QuestionRecord> = Vec::with_capacity(desired);
    let mut used = session_seen.clone();

    // 1. Unseen generated questions at the user's level.
    fill(&mut picked, &mut used, fresh, desired, Some(history_seen));

    // 2. Review items, bounded so repeats never dominate a set.
    let review_limit = (picked.len() + desired.div_ceil(3)).min(desired);
    fill(&mut picked, &mut used, review, review_limit, None);

    // 3. Cached pools at the adjacent difficulty levels.
    fill(&mut picked, &mut used, mixed, desired, Some(history_seen));

    // 4. Predefined fallback (session de-dup only).
    fill(&mut picked, &mut used, predefined, desired, None);

    // 5. Thin pools: re-admit historically seen generated material before
    //    returning short.
    fill(&mut picked, &mut used, fresh, desired, None);
    fill(&mut picked, &mut used, mixed, desired, None);

    picked.shuffle(&mut rand::rng());
    picked
}
