//! Asset handle implementation
//!
//! A cached asset is shared through reference-counted handles. Two handles
//! are equal when they point at the same loaded instance.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique asset IDs
static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed)
}

/// A strong handle to a loaded asset of type `T`.
///
/// Every successful load produces a new id, so a forced reload yields a
/// handle that compares unequal to the one it replaced.
#[derive(Debug)]
pub struct AssetHandle<T> {
    id: u64,
    inner: Arc<T>,
}

impl<T> AssetHandle<T> {
    /// Wrap a freshly loaded value
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            id: next_id(),
            inner: Arc::new(value),
        }
    }

    /// Get the unique ID of this load
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn get(&self) -> &T {
        &self.inner
    }

    /// True if both handles share the same instance
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this instance, the cache's included
    #[must_use]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> Hash for AssetHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> std::ops::Deref for AssetHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
