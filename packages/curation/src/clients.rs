//! Bounded, time-expiring cache of model client handles.
//!
//! Constructing a client per call wastes connection pools; caching one
//! per model identifier amortizes that. Entries expire after a TTL and
//! the map is capacity-bounded, with capacity and TTL injected at
//! construction — the cache is owned by process-wide state, not an
//! ambient singleton. Handles carry no conversation state, so sharing
//! one across concurrent requests is safe.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Default maximum number of cached clients.
pub const DEFAULT_CAPACITY: usize = 8;

struct CacheEntry<C> {
    client: Arc<C>,
    inserted_at: Instant,
}

/// Cache of shared client handles keyed by model identifier.
pub struct ClientCache<C> {
    entries: Mutex<HashMap<String, CacheEntry<C>>>,
    ttl: Duration,
    capacity: usize,
}

impl<C> ClientCache<C> {
    /// Create a cache with explicit capacity and TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Fetch the cached handle for `model_id`, constructing it with
    /// `build` on a miss or after expiry.
    pub fn get_or_insert(&self, model_id: &str, build: impl FnOnce() -> C) -> Arc<C> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();

        if let Some(entry) = entries.get(model_id) {
            if now.duration_since(entry.inserted_at) < self.ttl {
                return Arc::clone(&entry.client);
            }
            debug!(model_id, "cached client expired");
            entries.remove(model_id);
        }

        // Make room: drop expired entries first, then the oldest.
        entries.retain(|_, e| now.duration_since(e.inserted_at) < self.ttl);
        if entries.len() >= self.capacity {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }

        debug!(model_id, "constructing model client");
        let client = Arc::new(build());
        entries.insert(
            model_id.to_string(),
            CacheEntry {
                client: Arc::clone(&client),
                inserted_at: now,
            },
        );
        client
    }

    /// Drop every expired entry. Called from periodic housekeeping.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries
            .lock()
            .unwrap()
            .retain(|_, e| now.duration_since(e.inserted_at) < self.ttl);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything. Part of the shutdown path.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl<C> Default for ClientCache<C> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
