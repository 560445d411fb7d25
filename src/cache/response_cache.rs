//! Expiring in-memory store for raw API response bodies
//!
//! Provides a `ResponseCache` that keeps response bytes keyed by request URL and
//! runs a background reaper which drops entries older than the configured TTL.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

/// A single cached response body
#[derive(Debug, Clone)]
struct CacheEntry {
    /// When the entry was inserted
    created_at: Instant,
    /// The raw response body
    value: Bytes,
}

type Entries = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// Thread-safe response cache with a background reaper
///
/// Lookups never check freshness themselves: an entry stays visible until the
/// reaper removes it. The reaper ticks once per TTL, so an entry lives at most
/// `2 * ttl` after insertion.
///
/// Share the cache between tasks or threads by wrapping it in an `Arc`. The
/// reaper stops when [`ResponseCache::close`] is called or the cache is dropped.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Entries,
    ttl: Duration,
    closed: AtomicBool,
    shutdown_tx: mpsc::Sender<()>,
}

impl ResponseCache {
    /// Creates an empty cache and spawns its reaper on the current tokio runtime
    ///
    /// # Panics
    /// Panics if `ttl` is zero or if called outside a tokio runtime.
    pub fn new(ttl: Duration) -> Self {
        assert!(!ttl.is_zero(), "cache ttl must be greater than zero");

        let entries: Entries = Arc::new(RwLock::new(HashMap::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(reap_loop(Arc::clone(&entries), ttl, shutdown_rx));

        Self {
            entries,
            ttl,
            closed: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    /// Inserts or replaces the entry for `key`, stamping it with the current time
    pub fn add(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        let entry = CacheEntry {
            created_at: Instant::now(),
            value: value.into(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }

    /// Returns the stored body for `key`, if present
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// The staleness threshold and reap interval
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries currently held, including stale ones not yet reaped
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Signals the reaper to stop
    ///
    /// Only the first call has an effect. Entries already stored stay readable
    /// but no longer expire.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.try_send(());
    }

    /// Whether [`ResponseCache::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Periodically removes entries older than `ttl` until shut down
async fn reap_loop(entries: Entries, ttl: Duration, mut shutdown_rx: mpsc::Receiver<()>) {
    let mut interval = tokio::time::interval(ttl);
    // Skip the first tick (immediate)
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = reap(&entries, ttl, Instant::now());
                if removed > 0 {
                    debug!(removed, "reaped stale cache entries");
                }
            }
            // Fires on an explicit close and when the cache handle is dropped
            _ = shutdown_rx.recv() => {
                debug!("cache reaper stopped");
                break;
            }
        }
    }
}

/// Drops every entry older than `ttl` as of `now` under a single write lock
fn reap(entries: &Entries, ttl: Duration, now: Instant) -> usize {
    let mut map = entries.write().unwrap_or_else(PoisonError::into_inner);
    let before = map.len();
    map.retain(|_, entry| now.saturating_duration_since(entry.created_at) <= ttl);
    before - map.len()
}
