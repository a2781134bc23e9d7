//! Memoized Reference Implementation
//!
//! # How It Works
//!
//! 1. On first read, the computation runs inside a fresh track frame. The
//!    frame's combined tag and a snapshot of its revision are stored next to
//!    the result.
//!
//! 2. On later reads, the stored tag is validated against the snapshot. If
//!    nothing it covers was dirtied, the cached value is returned without
//!    invoking the computation.
//!
//! 3. Whether served from cache or recomputed, the combined tag is consumed
//!    into the enclosing frame, so an outer computation correctly ends up
//!    depending on everything this one read.
//!
//! There is no explicit fresh-to-stale transition: a reference discovers it
//! is stale lazily, when a read's validation fails.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::track::{consume_tag, track};
use crate::validate::{Revision, Tag};

/// Cached result of one evaluation.
struct CacheEntry<T> {
    snapshot: Revision,
    value: T,
    tag: Tag,
}

/// A derived computation with snapshot-based cache invalidation.
pub struct MemoizedReference<T>
where
    T: Clone + Send + Sync + 'static,
{
    eval: Arc<dyn Fn() -> T + Send + Sync>,
    cache: Arc<RwLock<Option<CacheEntry<T>>>>,
}

impl<T> MemoizedReference<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap a computation. It does not run until the first [`value`] call.
    ///
    /// [`value`]: MemoizedReference::value
    pub fn new<F>(eval: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            eval: Arc::new(eval),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Current value, recomputing only if the cache has been invalidated.
    pub fn value(&self) -> T {
        if let Some(value) = self.cached() {
            return value;
        }

        let (value, tag) = track(|| (self.eval)());
        let snapshot = tag.value();
        trace!(revision = snapshot.raw(), "memoized reference evaluated");
        consume_tag(&tag);
        *self.cache.write() = Some(CacheEntry {
            snapshot,
            value: value.clone(),
            tag,
        });
        value
    }

    /// Whether a (possibly stale) cached value exists.
    pub fn is_initialized(&self) -> bool {
        self.cache.read().is_some()
    }

    /// The combined tag of the last evaluation, if any.
    pub fn tag(&self) -> Option<Tag> {
        self.cache.read().as_ref().map(|entry| entry.tag.clone())
    }

    fn cached(&self) -> Option<T> {
        let cache = self.cache.read();
        let entry = cache.as_ref()?;
        if entry.tag.validate(entry.snapshot) {
            consume_tag(&entry.tag);
            Some(entry.value.clone())
        } else {
            None
        }
    }
}

impl<T> Clone for MemoizedReference<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            eval: Arc::clone(&self.eval),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<T> fmt::Debug for MemoizedReference<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizedReference")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
