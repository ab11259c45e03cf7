//! Short-lived in-memory cache for summary responses.
//!
//! Keys are a fingerprint of the first few hundred characters of the input
//! plus the requested level, so near-identical submissions share an entry.
//! Nothing is persisted.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::summary::SummaryLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: u64,
    level: SummaryLevel,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted: Instant,
    created_at: DateTime<Utc>,
}

/// A cache hit with the time the entry was created.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit<V> {
    pub value: V,
    pub created_at: DateTime<Utc>,
}

/// Expiring cache keyed by input fingerprint and level.
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: DashMap<CacheKey, CacheEntry<V>>,
    ttl: Duration,
    prefix_chars: usize,
    last_sweep: Mutex<Instant>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration, prefix_chars: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            prefix_chars,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    fn key(&self, text: &str, level: SummaryLevel) -> CacheKey {
        let mut hasher = DefaultHasher::new();
        for ch in text.chars().take(self.prefix_chars) {
            ch.hash(&mut hasher);
        }
        CacheKey {
            fingerprint: hasher.finish(),
            level,
        }
    }

    /// Fresh entry for this input, evicting it if it has expired.
    pub fn get(&self, text: &str, level: SummaryLevel) -> Option<CacheHit<V>> {
        let key = self.key(text, level);
        {
            let entry = self.entries.get(&key)?;
            if entry.inserted.elapsed() < self.ttl {
                return Some(CacheHit {
                    value: entry.value.clone(),
                    created_at: entry.created_at,
                });
            }
        }
        let ttl = self.ttl;
        self.entries.remove_if(&key, |_, e| e.inserted.elapsed() >= ttl);
        None
    }

    /// Store a value, returning its creation time.
    ///
    /// Expired entries under other keys are swept at most once per TTL.
    pub fn insert(&self, text: &str, level: SummaryLevel, value: V) -> DateTime<Utc> {
        self.sweep_if_due();
        let created_at = Utc::now();
        self.entries.insert(
            self.key(text, level),
            CacheEntry {
                value,
                inserted: Instant::now(),
                created_at,
            },
        );
        created_at
    }

    fn sweep_if_due(&self) {
        let mut last = self.last_sweep.lock().unwrap_or_else(|e| e.into_inner());
        if last.elapsed() < self.ttl {
            return;
        }
        *last = Instant::now();
        drop(last);
        self.purge_expired();
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.inserted.elapsed() < ttl);
        let dropped = before.saturating_sub(self.entries.len());
        if dropped > 0 {
            tracing::debug!(dropped, "purged expired cache entries");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
