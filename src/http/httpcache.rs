//! Tagged response cache.
//!
//! An in-memory store mapping cache keys (effective request paths) to values
//! with a time-to-live and an optional set of [`CacheTag`]s:
//! - Lazy expiry: a stale entry is removed when it is read
//! - Periodic expiry: a background sweep removes stale entries
//! - Bulk invalidation by literal or pattern tags
//! - Thread-safe concurrent access

use crate::http::cachetag::{any_match, CacheTag};
use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Default sweep interval for [`TaggedCache::default`].
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

type Entries<V> = DashMap<String, CacheEntry<V>>;

/// Cached value entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub tags: Vec<CacheTag>,
    /// `None` when the TTL reaches past what `Instant` can represent.
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    /// An entry is logically absent once `now >= expires_at`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Default)]
struct Sweeper {
    interval: Option<Duration>,
    task: Option<JoinHandle<()>>,
}

impl Sweeper {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

/// In-memory cache with TTL expiry and tag-based invalidation.
///
/// Shared by every request of a [`Client`](crate::client::Client). The sweep
/// task starts lazily on the first [`set`](Self::set) and only holds a weak
/// reference to the entries, so it ends once the cache is dropped.
pub struct TaggedCache<V> {
    entries: Arc<Entries<V>>,
    sweeper: Mutex<Sweeper>,
}

impl<V: Clone + Send + Sync + 'static> Default for TaggedCache<V> {
    fn default() -> Self {
        Self::new(Some(DEFAULT_FLUSH_INTERVAL))
    }
}

impl<V: Clone + Send + Sync + 'static> TaggedCache<V> {
    /// Create a cache. `None` (or a zero interval) disables periodic sweeps.
    pub fn new(flush_interval: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            sweeper: Mutex::new(Sweeper {
                interval: normalize_interval(flush_interval),
                task: None,
            }),
        }
    }

    /// Look up a value. A stale entry is removed and reported absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();

        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some()
        {
            tracing::debug!(key = %key, "cache entry expired on read");
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value, replacing any entry under `key`.
    pub fn set(&self, key: impl Into<String>, value: V, tags: &[CacheTag], ttl: Duration) {
        let entry = CacheEntry {
            value,
            tags: tags.to_vec(),
            expires_at: Instant::now().checked_add(ttl),
        };
        self.entries.insert(key.into(), entry);

        self.ensure_sweeper();
    }

    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Remove every entry.
    pub fn delete_all(&self) {
        self.entries.clear();
    }

    /// Remove every entry carrying a tag that matches one of `tags`.
    /// Entries stored without tags are never touched.
    pub fn delete_by_tags(&self, tags: &[CacheTag]) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !any_match(tags, &entry.tags);
            if !keep {
                removed += 1;
            }
            keep
        });

        tracing::debug!(removed, tags = ?tags.iter().map(|t| t.to_string()).collect::<Vec<_>>(), "cache invalidated by tags");
        removed
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn flush(&self) -> usize {
        flush_entries(&self.entries)
    }

    /// Replace the sweep interval. Any running sweep task is cancelled; the
    /// next [`set`](Self::set) starts a task with the new interval.
    pub fn set_flush_interval(&self, interval: Option<Duration>) {
        let mut sweeper = self.lock_sweeper();
        sweeper.cancel();
        sweeper.interval = normalize_interval(interval);
    }

    pub fn flush_interval(&self) -> Option<Duration> {
        self.lock_sweeper().interval
    }

    /// Whether a background sweep task is currently scheduled.
    pub fn is_sweeping(&self) -> bool {
        self.lock_sweeper().is_running()
    }

    /// Stop the sweep task and drop every entry.
    pub fn dispose(&self) {
        self.lock_sweeper().cancel();
        self.entries.clear();
    }

    /// Number of physically stored entries, including stale ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_sweeper(&self) {
        let mut sweeper = self.lock_sweeper();

        let Some(interval) = sweeper.interval else {
            return;
        };
        if sweeper.is_running() {
            return;
        }

        // Without a runtime there is nothing to sweep on; lazy expiry still applies.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime, cache sweeper not started");
            return;
        };

        let entries = Arc::downgrade(&self.entries);
        sweeper.task = Some(handle.spawn(sweep(entries, interval)));
        tracing::debug!(interval_ms = interval.as_millis() as u64, "cache sweeper started");
    }

    fn lock_sweeper(&self) -> MutexGuard<'_, Sweeper> {
        self.sweeper.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> Drop for TaggedCache<V> {
    fn drop(&mut self) {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}

impl<V> fmt::Debug for TaggedCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedCache")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

async fn sweep<V>(entries: Weak<Entries<V>>, interval: Duration) {
    let Some(start) = tokio::time::Instant::now().checked_add(interval) else {
        // Never due; idle until cancelled.
        tracing::debug!(interval_secs = interval.as_secs(), "cache sweep interval out of range");
        std::future::pending::<()>().await;
        return;
    };
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(entries) = entries.upgrade() else {
            break;
        };
        let removed = flush_entries(&entries);
        if removed > 0 {
            tracing::debug!(removed, "cache sweep removed expired entries");
        }
    }
}

fn flush_entries<V>(entries: &Entries<V>) -> usize {
    let now = Instant::now();
    let mut removed = 0;
    entries.retain(|_, entry| {
        let keep = !entry.is_expired(now);
        if !keep {
            removed += 1;
        }
        keep
    });
    removed
}

fn normalize_interval(interval: Option<Duration>) -> Option<Duration> {
    interval.filter(|d| !d.is_zero())
}
