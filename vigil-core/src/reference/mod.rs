//! Memoized and Path References
//!
//! This module implements the derived layer of the engine.
//!
//! # Concepts
//!
//! ## Memoized references
//!
//! A memoized reference wraps a zero-argument computation and caches its
//! result, keyed on tag validity rather than input equality. The
//! computation runs inside its own track frame; the frame's combined tag
//! plus a revision snapshot decide on every later read whether the cache
//! still stands. Nothing is notified when a dependency changes; staleness
//! is discovered lazily, on the next read.
//!
//! ## Path references
//!
//! Path references compose memoized references to resolve nested property
//! paths (`contact.person.first_name`) lazily. Each hop is independently
//! cached, so a deep read only recomputes the segments whose dependencies
//! actually changed.

mod memo;
mod path;

pub use memo::MemoizedReference;
pub use path::{state, PathReference, Reference, RootReference};
