//! Revision Clock and Tags
//!
//! This module implements the leaf layer of the invalidation engine: a
//! process-wide monotonic revision clock and the tags stamped against it.
//!
//! # Concepts
//!
//! ## Revisions
//!
//! A revision is a comparable monotonic stamp. The clock only ever moves
//! forward, and it moves exactly once per dirtying write, so comparing two
//! stamps answers "has anything changed since" with a single integer compare.
//!
//! ## Tags
//!
//! A tag is an opaque handle over the invalidation state of a value or a
//! group of values. Constant tags never change. Updatable tags are dirtied
//! explicitly by writes. Combinator tags report the maximum revision among a
//! recorded set of children, which is how a derived computation ends up
//! covered by everything it read.
//!
//! # Implementation Notes
//!
//! Validity is checked lazily at read time, never pushed at write time.
//! Dirtying is a single store with no subscriber lists to walk, and a
//! multi-step update cannot glitch a reader that has not asked for a value
//! yet.

mod revision;
mod tag;

pub use revision::{bump, current, Revision};
pub use tag::{combine, Tag, CONSTANT_TAG};

pub(crate) use tag::UpdatableState;
