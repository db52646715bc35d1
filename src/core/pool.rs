//! Lock-free object pool for entry state
//!
//! Acquire pops an idle object or builds a fresh one with the factory; release
//! pushes it back unless the pool is already full, in which case the object is
//! simply dropped. Objects are handed out by value, so an object can never be
//! held by two callers at once.

use crossbeam_queue::ArrayQueue;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of idle objects kept for reuse
pub const DEFAULT_POOL_CAPACITY: usize = 256;

/// Counters describing how well the pool is reusing objects
#[derive(Debug, Default)]
pub struct PoolStats {
    allocated: AtomicU64,
    reused: AtomicU64,
    discarded: AtomicU64,
}

impl PoolStats {
    /// Objects built by the factory
    #[inline]
    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Acquisitions served from idle objects
    #[inline]
    pub fn reused(&self) -> u64 {
        self.reused.load(Ordering::Relaxed)
    }

    /// Releases dropped because the pool was full
    #[inline]
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    /// Share of acquisitions served without allocating (0.0 - 100.0)
    pub fn hit_rate(&self) -> f64 {
        let reused = self.reused() as f64;
        let total = reused + self.allocated() as f64;
        if total == 0.0 {
            0.0
        } else {
            (reused / total) * 100.0
        }
    }
}

pub struct Pool<T> {
    idle: ArrayQueue<T>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    stats: PoolStats,
}

impl<T> Pool<T> {
    /// Create a pool that keeps at most `capacity` idle objects
    pub fn new(capacity: usize, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            idle: ArrayQueue::new(capacity.max(1)),
            factory: Box::new(factory),
            stats: PoolStats::default(),
        }
    }

    pub fn acquire(&self) -> T {
        match self.idle.pop() {
            Some(item) => {
                self.stats.reused.fetch_add(1, Ordering::Relaxed);
                item
            }
            None => {
                self.stats.allocated.fetch_add(1, Ordering::Relaxed);
                (self.factory)()
            }
        }
    }

    /// Return an object. The caller resets it first.
    pub fn release(&self, item: T) {
        if self.idle.push(item).is_err() {
            self.stats.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of idle objects waiting for reuse
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    pub fn capacity(&self) -> usize {
        self.idle.capacity()
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle.len())
            .field("capacity", &self.idle.capacity())
            .field("stats", &self.stats)
            .finish()
    }
}
