//! In-memory `web_id -> run_id` correlation with TTL eviction.
//!
//! The trigger records the run it started; the stream handler looks it up
//! before falling back to the persisted `webs.run_id`. Terminal
//! reconciliation removes the entry, and [`crate::background::run_eviction`]
//! drops abandoned ones so the map cannot grow without bound.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use webs_core::types::DbId;

#[derive(Debug, Clone)]
struct RunEntry {
    run_id: String,
    inserted_at: Instant,
}

/// TTL-bounded correlation store.
#[derive(Debug)]
pub struct RunRegistry {
    ttl: Duration,
    entries: RwLock<HashMap<DbId, RunEntry>>,
}

impl RunRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Record (or replace) the run for a web.
    pub async fn insert(&self, web_id: DbId, run_id: impl Into<String>) {
        self.entries.write().await.insert(
            web_id,
            RunEntry {
                run_id: run_id.into(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Run id for a web, ignoring expired entries.
    pub async fn get(&self, web_id: DbId) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(&web_id)
            .filter(|entry| !self.is_expired(entry))
            .map(|entry| entry.run_id.clone())
    }

    /// Forget a web's run, returning it if present.
    pub async fn remove(&self, web_id: DbId) -> Option<String> {
        self.entries
            .write()
            .await
            .remove(&web_id)
            .map(|entry| entry.run_id)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry));
        before - entries.len()
    }

    /// Number of entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_expired(&self, entry: &RunEntry) -> bool {
        entry.inserted_at.elapsed() >= self.ttl
    }
}
