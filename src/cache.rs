//! Read-through cache for the catalog collections
//!
//! [`CatalogCache`] holds one TTL slot per collection (products, categories).
//! It is a plain state holder: the read-through and serve-stale-on-error
//! logic lives in the catalog service, which asks for a fresh value first and
//! falls back to the stale one when the store cannot be reached.
//!
//! Freshness is judged against an injected [`Clock`] so tests can move time
//! deterministically. The cache is shared process-wide state; concurrent
//! populating fetches for the same collection race last-writer-wins, which is
//! acceptable for a TTL display cache (it is not linearizable).

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::{Category, Product};

/// Source of monotonic time for cache freshness checks
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Slot<T> {
    value: T,
    refreshed_at: Instant,
}

/// TTL cache over the product and category collections
pub struct CatalogCache {
    products: RwLock<Option<Slot<Vec<Product>>>>,
    categories: RwLock<Option<Slot<Vec<Category>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CatalogCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            products: RwLock::new(None),
            categories: RwLock::new(None),
            ttl,
            clock,
        }
    }

    /// Cached products, only while the entry is younger than the TTL
    pub fn fresh_products(&self) -> Option<Vec<Product>> {
        self.fresh(&self.products, "products")
    }

    /// Cached categories, only while the entry is younger than the TTL
    pub fn fresh_categories(&self) -> Option<Vec<Category>> {
        self.fresh(&self.categories, "categories")
    }

    /// Last cached products regardless of age (serve-stale-on-error source)
    pub fn stale_products(&self) -> Option<Vec<Product>> {
        self.stale(&self.products)
    }

    /// Last cached categories regardless of age
    pub fn stale_categories(&self) -> Option<Vec<Category>> {
        self.stale(&self.categories)
    }

    /// Populate the product slot with a fresh timestamp
    pub fn store_products(&self, value: Vec<Product>) {
        self.store(&self.products, value);
    }

    /// Populate the category slot with a fresh timestamp
    pub fn store_categories(&self, value: Vec<Category>) {
        self.store(&self.categories, value);
    }

    /// Force the next product read to go live
    pub fn invalidate_products(&self) {
        debug!("products cache invalidated");
        *write(&self.products) = None;
    }

    /// Force the next category read to go live
    pub fn invalidate_categories(&self) {
        debug!("categories cache invalidated");
        *write(&self.categories) = None;
    }

    fn fresh<T: Clone>(&self, slot: &RwLock<Option<Slot<T>>>, what: &str) -> Option<T> {
        let guard = read(slot);
        let entry = guard.as_ref()?;
        let age = self.clock.now().saturating_duration_since(entry.refreshed_at);
        if age < self.ttl {
            debug!(collection = what, "serving cached collection");
            Some(entry.value.clone())
        } else {
            None
        }
    }

    fn stale<T: Clone>(&self, slot: &RwLock<Option<Slot<T>>>) -> Option<T> {
        read(slot).as_ref().map(|entry| entry.value.clone())
    }

    fn store<T>(&self, slot: &RwLock<Option<Slot<T>>>, value: T) {
        *write(slot) = Some(Slot {
            value,
            refreshed_at: self.clock.now(),
        });
    }
}

// A slot only ever holds whole replaced values, so its contents stay valid
// even when a panic poisons the lock; recover the guard instead of
// propagating the poison.
fn read<T>(slot: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    slot.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(slot: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    slot.write().unwrap_or_else(PoisonError::into_inner)
}
