//! Tag Implementation
//!
//! A tag answers one question: what is the latest revision at which anything
//! reachable from this handle changed?
//!
//! # How Tags Work
//!
//! 1. Every tracked cell owns an updatable tag. Writing the cell dirties the
//!    tag, stamping it with a fresh revision from the global clock.
//!
//! 2. A computation that reads several cells ends up with a combinator tag
//!    over their tags. Its value is the maximum child revision, recomputed on
//!    every call. Caching, where wanted, happens one layer up in the
//!    memoized reference.
//!
//! 3. A reader snapshots `tag.value()` once, then later asks
//!    `tag.validate(snapshot)`. A mismatch means something reachable from the
//!    tag was dirtied in between.
//!
//! # Identity
//!
//! Tags are shared handles: cloning one clones a pointer, not state, and
//! equality is identity. That is what makes deduplication inside a
//! combinator meaningful, and what lets a combinator observe dirtying of a
//! cell it recorded long ago.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexSet;

use super::revision::{self, Revision};
use crate::error::TrackError;

/// The constant tag: fixed at the initial revision, valid forever.
///
/// Shared by everything that has no meaningful identity to invalidate on.
pub const CONSTANT_TAG: Tag = Tag(TagKind::Constant);

/// Shared state backing an updatable tag.
///
/// The state is shared between the cell that owns it and every combinator
/// that recorded it, so a dirtying write is visible everywhere the tag was
/// ever consumed.
#[derive(Debug)]
pub(crate) struct UpdatableState {
    last_dirtied: AtomicU64,
}

impl UpdatableState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            last_dirtied: AtomicU64::new(Revision::INITIAL.raw()),
        })
    }

    pub(crate) fn revision(&self) -> Revision {
        Revision::from_raw(self.last_dirtied.load(Ordering::SeqCst))
    }

    pub(crate) fn mark_dirty(&self) -> Revision {
        let revision = revision::bump();
        self.last_dirtied.store(revision.raw(), Ordering::SeqCst);
        revision
    }
}

/// An opaque revision-bearing handle.
///
/// Cheap to clone; clones share state and compare equal by identity.
#[derive(Clone)]
pub struct Tag(TagKind);

#[derive(Clone)]
enum TagKind {
    Constant,
    Updatable(Arc<UpdatableState>),
    Combinator(Arc<[Tag]>),
}

impl Tag {
    /// Create a fresh updatable tag at the initial revision.
    pub fn updatable() -> Tag {
        Tag(TagKind::Updatable(UpdatableState::new()))
    }

    pub(crate) fn from_state(state: Arc<UpdatableState>) -> Tag {
        Tag(TagKind::Updatable(state))
    }

    /// The kind of this tag, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match &self.0 {
            TagKind::Constant => "constant",
            TagKind::Updatable(_) => "updatable",
            TagKind::Combinator(_) => "combinator",
        }
    }

    /// Whether this tag can never be invalidated.
    pub fn is_constant(&self) -> bool {
        matches!(self.0, TagKind::Constant)
    }

    /// Latest revision at which anything reachable from this tag changed.
    ///
    /// Combinators recompute the maximum over their children on every call.
    /// An empty combinator behaves as a constant.
    pub fn value(&self) -> Revision {
        match &self.0 {
            TagKind::Constant => Revision::INITIAL,
            TagKind::Updatable(state) => state.revision(),
            TagKind::Combinator(children) => children
                .iter()
                .map(Tag::value)
                .max()
                .unwrap_or(Revision::INITIAL),
        }
    }

    /// Mark an updatable tag as changed, advancing the global clock.
    ///
    /// Dirtying a constant or combinator tag is a contract violation and
    /// returns [`TrackError::InvalidOperation`].
    pub fn dirty(&self) -> Result<(), TrackError> {
        match &self.0 {
            TagKind::Updatable(state) => {
                state.mark_dirty();
                Ok(())
            }
            _ => Err(TrackError::InvalidOperation { kind: self.kind() }),
        }
    }

    /// Check whether nothing reachable from this tag changed since the
    /// snapshot was taken via [`Tag::value`].
    pub fn validate(&self, snapshot: Revision) -> bool {
        self.value() <= snapshot
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Tag) -> bool {
        match (&self.0, &other.0) {
            (TagKind::Constant, TagKind::Constant) => true,
            (TagKind::Updatable(a), TagKind::Updatable(b)) => Arc::ptr_eq(a, b),
            (TagKind::Combinator(a), TagKind::Combinator(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            TagKind::Constant => 0u8.hash(state),
            TagKind::Updatable(shared) => {
                1u8.hash(state);
                (Arc::as_ptr(shared) as usize).hash(state);
            }
            TagKind::Combinator(children) => {
                2u8.hash(state);
                (children.as_ptr() as usize).hash(state);
            }
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("kind", &self.kind())
            .field("value", &self.value().raw())
            .finish()
    }
}

/// Combine a set of tags into a single tag covering all of them.
///
/// Constants carry no information and are filtered out. An empty or
/// all-constant set combines to [`CONSTANT_TAG`]; a single survivor is
/// returned as-is; anything else becomes a combinator over the deduplicated
/// members, preserving consumption order.
pub fn combine<I>(tags: I) -> Tag
where
    I: IntoIterator<Item = Tag>,
{
    let mut distinct: IndexSet<Tag> = IndexSet::new();
    for tag in tags {
        if !tag.is_constant() {
            distinct.insert(tag);
        }
    }

    match distinct.len() {
        0 => CONSTANT_TAG,
        1 => distinct.swap_remove_index(0).unwrap_or(CONSTANT_TAG),
        _ => Tag(TagKind::Combinator(distinct.into_iter().collect())),
    }
}
