use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::metrics::{record_cache_hit, record_cache_miss};
use crate::models::question::QuestionRecord;
use crate::models::Stage;

struct PoolEntry {
    questions: Vec<QuestionRecord>,
    stored_at: Instant,
}

/// In-memory pool of generated questions keyed by (stage, difficulty level).
/// Injected through `AppState` rather than held as module state; entries
/// expire after the configured TTL, enforced on lookup, and stale entries are
/// swept on insert.
pub struct QuestionCache {
    ttl: Duration,
    pools: Mutex<HashMap<(Stage, u8), PoolEntry>>,
}

impl QuestionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pools: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, stage: Stage, level: u8) -> Option<Vec<QuestionRecord>> {
        let mut pools = self.pools.lock().unwrap_or_else(|e| e.into_inner());

        let expired = match pools.get(&(stage, level)) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                record_cache_hit();
                return Some(entry.questions.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            pools.remove(&(stage, level));
        }
        record_cache_miss();
        None
    }

    pub fn put(&self, stage: Stage, level: u8, questions: Vec<QuestionRecord>) {
        let mut pools = self.pools.lock().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        pools.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        pools.insert(
            (stage, level),
            PoolEntry {
                questions,
                stored_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionSource;

    fn pool(text: &str) -> Vec<QuestionRecord> {
        vec![QuestionRecord {
            text: text.to_string(),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_answer: "a".to_string(),
            correct_reason: String::new(),
            incorrect_reason: String::new(),
            difficulty_level: 1,
            source: QuestionSource::Generated,
        }]
    }

    #[test]
    fn stores_and_returns_a_pool() {
        let cache = QuestionCache::new(Duration::from_secs(3600));
        cache.put(Stage::Prenatal, 1, pool("q1"));

        let found = cache.get(Stage::Prenatal, 1).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "q1");
    }

    #[test]
    fn keys_are_scoped_by_stage_and_level() {
        let cache = QuestionCache::new(Duration::from_secs(3600));
        cache.put(Stage::Prenatal, 1, pool("q1"));

        assert!(cache.get(Stage::Prenatal, 2).is_none());
        assert!(cache.get(Stage::Birth, 1).is_none());
    }

    #[test]
    fn expired_entries_are_evicted() {
        let cache = QuestionCache::new(Duration::ZERO);
        cache.put(Stage::Postnatal, 1, pool("q1"));

        assert!(cache.get(Stage::Postnatal, 1).is_none());
        // A second lookup hits the empty slot, not a stale entry.
        assert!(cache.get(Stage::Postnatal, 1).is_none());
    }
}
