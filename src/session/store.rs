//! Server-side session storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

/// Values held by one browser session.
pub type SessionValues = HashMap<String, Value>;

#[derive(Debug, Clone)]
struct SessionEntry {
    values: SessionValues,
    last_accessed: Instant,
}

impl SessionEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_accessed.elapsed() >= ttl
    }
}

/// Process-wide session map keyed by session id.
///
/// Sessions idle for longer than `ttl` are treated as absent. Expired
/// entries are evicted lazily: on lookup, and in bulk once the map grows
/// past `cleanup_threshold`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, SessionEntry>>,
    ttl: Duration,
    cleanup_threshold: Arc<AtomicUsize>,
}

impl SessionStore {
    const DEFAULT_CLEANUP_THRESHOLD: usize = 10_000;

    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
            cleanup_threshold: Arc::new(AtomicUsize::new(Self::DEFAULT_CLEANUP_THRESHOLD)),
        }
    }

    /// Override the size at which a save sweeps expired sessions.
    pub fn with_cleanup_threshold(self, threshold: usize) -> Self {
        self.cleanup_threshold.store(threshold, Ordering::Relaxed);
        self
    }

    /// Fetch a live session's values, refreshing its idle timer.
    pub fn load(&self, id: &str) -> Option<SessionValues> {
        {
            let mut entry = self.inner.get_mut(id)?;
            if !entry.is_expired(self.ttl) {
                entry.last_accessed = Instant::now();
                return Some(entry.values.clone());
            }
        }

        if self.inner.remove_if(id, |_, entry| entry.is_expired(self.ttl)).is_some() {
            tracing::debug!("Evicted expired session on load");
        }
        None
    }

    /// Store a session's values. The last writer for an id wins.
    pub fn save(&self, id: &str, values: SessionValues) {
        self.inner.insert(
            id.to_string(),
            SessionEntry {
                values,
                last_accessed: Instant::now(),
            },
        );

        if self.inner.len() > self.cleanup_threshold.load(Ordering::Relaxed) {
            self.evict_expired();
        }
    }

    pub fn remove(&self, id: &str) {
        self.inner.remove(id);
    }

    /// Drop every expired session, returning how many were removed.
    pub fn evict_expired(&self) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, entry| !entry.is_expired(self.ttl));
        let removed = before.saturating_sub(self.inner.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.inner.len(), "Evicted expired sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
