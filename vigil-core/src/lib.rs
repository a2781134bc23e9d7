//! Vigil Core
//!
//! This crate provides the pull-based invalidation engine for the Vigil
//! reactive runtime. It implements:
//!
//! - A process-wide monotonic revision clock
//! - Revision-bearing tags (constant, updatable, combinator)
//! - Autotracking: recording which tags a computation reads
//! - Tracked storage cells for per-object, per-property state
//! - Memoized references that re-derive only what actually changed
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `validate`: Revision clock and the tag abstraction
//! - `track`: Frame stack and tracked storage cells
//! - `object`: Host-facing value union and object model
//! - `reference`: Memoized references and path-reference chains
//!
//! # Design
//!
//! Validity is checked lazily at read time, never pushed at write time.
//! Nothing is notified when a cell changes; a computation discovers it is
//! stale the next time something asks for its value. Writes stay O(1) with
//! no subscriber lists to maintain, and a reader can never observe a
//! half-applied multi-step update it did not ask for.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vigil_core::object::{Object, Shape, Value};
//! use vigil_core::reference::MemoizedReference;
//! use vigil_core::track::TrackedStorage;
//!
//! let storage = Arc::new(TrackedStorage::new());
//! let mut shape = Shape::new();
//! shape.mark_tracked("count");
//! let counter = Object::new(Arc::clone(&storage), Arc::new(shape));
//! counter.set("count", Value::Int(1));
//!
//! let subject = counter.clone();
//! let doubled = MemoizedReference::new(move || match subject.get("count") {
//!     Value::Int(n) => n * 2,
//!     _ => 0,
//! });
//!
//! assert_eq!(doubled.value(), 2);  // evaluates
//! assert_eq!(doubled.value(), 2);  // cache-served
//! counter.set("count", Value::Int(5));
//! assert_eq!(doubled.value(), 10); // re-evaluates
//! ```

pub mod error;
pub mod object;
pub mod reference;
pub mod track;
pub mod validate;
