//! Track Frame Stack
//!
//! The frame stack records which tags a computation reads. It is shaped like
//! the call stack, not a queue: computing one tracked value while already
//! inside another tracked computation pushes a nested frame, and tags
//! consumed by the inner computation attribute to the inner frame only.
//!
//! # Implementation
//!
//! Each thread owns an independent stack in a thread local. This keeps the
//! common single-threaded case free of synchronization and guarantees that
//! tracking never crosses thread boundaries: a frame opened on one logical
//! call chain cannot leak consumption from another.

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::error::TrackError;
use crate::validate::{combine, Tag, CONSTANT_TAG};

/// Consumed tags of one open frame.
///
/// Most computations read only a handful of cells, so the buffer lives
/// inline until it outgrows its capacity.
type Frame = SmallVec<[Tag; 8]>;

thread_local! {
    static FRAME_STACK: RefCell<Vec<Frame>> = RefCell::new(Vec::new());
}

/// Open a new track frame on this thread's stack.
///
/// Every begin must be paired with exactly one [`end_track_frame`]. An
/// unpaired begin leaks consumption into whatever computation runs next;
/// prefer [`track`], which cannot be left unclosed.
pub fn begin_track_frame() {
    FRAME_STACK.with(|stack| stack.borrow_mut().push(Frame::new()));
}

/// Record a tag into the innermost open frame.
///
/// Outside any frame this is a no-op: untracked reads are legal and simply
/// never invalidate anything.
pub fn consume_tag(tag: &Tag) {
    FRAME_STACK.with(|stack| {
        if let Some(frame) = stack.borrow_mut().last_mut() {
            frame.push(tag.clone());
        }
    });
}

/// Close the innermost frame, combining everything it consumed into one tag.
///
/// Returns [`TrackError::UnpairedTrackFrame`] when no frame is open.
pub fn end_track_frame() -> Result<Tag, TrackError> {
    FRAME_STACK.with(|stack| {
        let frame = stack
            .borrow_mut()
            .pop()
            .ok_or(TrackError::UnpairedTrackFrame)?;
        Ok(combine(frame))
    })
}

/// Check whether a frame is open on this thread.
pub fn is_tracking() -> bool {
    FRAME_STACK.with(|stack| !stack.borrow().is_empty())
}

/// Guard that closes the frame it opened even if the computation unwinds,
/// so a panicking computation cannot leak consumption into the enclosing
/// frame.
struct FrameGuard {
    finished: bool,
}

impl FrameGuard {
    fn open() -> Self {
        begin_track_frame();
        Self { finished: false }
    }

    fn finish(mut self) -> Tag {
        self.finished = true;
        // The guard opened this frame itself, so the stack cannot be empty.
        end_track_frame().unwrap_or(CONSTANT_TAG)
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if !self.finished {
            let _ = end_track_frame();
        }
    }
}

/// Run a computation inside its own track frame.
///
/// Returns the result together with the combined tag of everything the
/// computation consumed.
pub fn track<R>(f: impl FnOnce() -> R) -> (R, Tag) {
    let guard = FrameGuard::open();
    let result = f();
    (result, guard.finish())
}

/// Run a computation with consumption suppressed.
///
/// Reads still resolve normally; whatever they consume is collected into a
/// throwaway frame and discarded instead of attributing to the enclosing
/// one.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _guard = FrameGuard::open();
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consuming_outside_any_frame_is_a_noop() {
        assert!(!is_tracking());
        // Must not panic or leave state behind.
        consume_tag(&Tag::updatable());
        assert!(!is_tracking());
    }

    #[test]
    fn frame_combines_consumed_tags() {
        let a = Tag::updatable();
        let b = Tag::updatable();

        let ((), tag) = track(|| {
            consume_tag(&a);
            consume_tag(&b);
        });

        let snapshot = tag.value();
        assert!(tag.validate(snapshot));

        a.dirty().expect("updatable tags can be dirtied");
        assert!(!tag.validate(snapshot));
    }

    #[test]
    fn empty_frame_combines_to_constant() {
        let ((), tag) = track(|| {});
        assert!(tag.is_constant());
    }

    #[test]
    fn nested_frames_do_not_mix() {
        let outer_dep = Tag::updatable();
        let inner_dep = Tag::updatable();

        let ((), outer_tag) = track(|| {
            consume_tag(&outer_dep);

            let ((), inner_tag) = track(|| {
                consume_tag(&inner_dep);
            });

            // The inner frame saw only its own consumption.
            let snapshot = inner_tag.value();
            outer_dep.dirty().expect("updatable tags can be dirtied");
            assert!(inner_tag.validate(snapshot));
        });

        // The outer frame saw only the outer consumption.
        let snapshot = outer_tag.value();
        inner_dep.dirty().expect("updatable tags can be dirtied");
        assert!(outer_tag.validate(snapshot));

        outer_dep.dirty().expect("updatable tags can be dirtied");
        assert!(!outer_tag.validate(snapshot));
    }

    #[test]
    fn ending_without_a_begin_is_an_error() {
        assert_eq!(end_track_frame(), Err(TrackError::UnpairedTrackFrame));
    }

    #[test]
    fn explicit_begin_end_pairing() {
        begin_track_frame();
        assert!(is_tracking());

        let tag = Tag::updatable();
        consume_tag(&tag);

        let combined = end_track_frame().expect("frame was opened");
        assert_eq!(combined, tag);
        assert!(!is_tracking());
    }

    #[test]
    fn untrack_discards_consumption() {
        let hidden = Tag::updatable();

        let ((), tag) = track(|| {
            untrack(|| consume_tag(&hidden));
        });

        let snapshot = tag.value();
        hidden.dirty().expect("updatable tags can be dirtied");
        assert!(tag.validate(snapshot));
    }

    #[test]
    fn panicking_computation_does_not_leak_its_frame() {
        let result = std::panic::catch_unwind(|| {
            track(|| -> () { panic!("boom") });
        });
        assert!(result.is_err());
        assert!(!is_tracking());

        // The enclosing frame is unaffected by the unwound inner one.
        let dep = Tag::updatable();
        let ((), tag) = track(|| {
            consume_tag(&dep);
            let inner = std::panic::catch_unwind(|| {
                track(|| -> () { panic!("boom") });
            });
            assert!(inner.is_err());
        });

        let snapshot = tag.value();
        dep.dirty().expect("updatable tags can be dirtied");
        assert!(!tag.validate(snapshot));
    }
}
