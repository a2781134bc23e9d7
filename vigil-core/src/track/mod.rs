//! Autotracking
//!
//! This module records which tags a computation reads, without explicit
//! subscription. It has two halves:
//!
//! - A thread-local stack of open track frames. Reading a tracked cell
//!   consumes the cell's tag into the innermost open frame; closing the
//!   frame combines everything it collected into one tag.
//!
//! - Tracked storage: an arena of per-object, per-property cells, each
//!   pairing a raw value with an updatable tag. Every read funnels through
//!   [`TrackedStorage::get`], which is where consumption happens, and every
//!   write through [`TrackedStorage::set`], which is where dirtying happens.
//!
//! Tracking is single-threaded-cooperative per stack: each thread owns an
//! independent stack, and a frame opened on one thread cannot observe reads
//! made on another. The storage arena itself is shared and sharded.

mod frame;
mod storage;

pub use frame::{
    begin_track_frame, consume_tag, end_track_frame, is_tracking, track, untrack,
};
pub use storage::{ObjectHandle, TrackedStorage};
