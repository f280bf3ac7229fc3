//! Reusable working-memory pools
//!
//! Each decode call borrows its sliding window (or LZW tree) from a [`Pool`]
//! and gets it back through the [`Pooled`] guard, which returns the buffer on
//! drop. Error returns and panics inside a decoder therefore never leak an
//! instance, and two in-flight decodes never share one.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

/// Default number of idle instances a pool keeps around
pub const DEFAULT_MAX_IDLE: usize = 4;

/// Thread-safe free list of reusable instances
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    max_idle: usize,
    create: fn() -> T,
}

impl<T> Pool<T> {
    /// Create an empty pool that builds new instances with `create`
    pub fn new(create: fn() -> T) -> Self {
        Self::with_max_idle(create, DEFAULT_MAX_IDLE)
    }

    /// Create an empty pool retaining at most `max_idle` returned instances
    pub fn with_max_idle(create: fn() -> T, max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            create,
        }
    }

    /// Take an idle instance, or build a new one when none is available
    pub fn acquire(&self) -> Pooled<'_, T> {
        let reused = self.lock().pop();
        let item = reused.unwrap_or_else(self.create);
        Pooled {
            item: Some(item),
            pool: self,
        }
    }

    /// Number of instances currently waiting for reuse
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    /// Maximum number of idle instances retained
    pub fn max_idle(&self) -> usize {
        self.max_idle
    }

    fn release(&self, item: T) {
        let mut idle = self.lock();
        if idle.len() < self.max_idle {
            idle.push(item);
        }
    }

    // A panic while the lock is held cannot leave the Vec half-updated
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle())
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

/// Exclusive loan of a pooled instance, returned to the pool on drop
pub struct Pooled<'a, T> {
    item: Option<T>,
    pool: &'a Pool<T>,
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `drop` takes the item out
        match &self.item {
            Some(item) => item,
            None => unreachable!("pooled item accessed after release"),
        }
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.item {
            Some(item) => item,
            None => unreachable!("pooled item accessed after release"),
        }
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
