//! Tracked Storage
//!
//! Per-object, per-property cells pairing a raw value with an updatable tag.
//! Cells live in an arena owned by the storage, indexed by a stable integer
//! handle issued when the owner registers, and are reclaimed when the owner
//! is explicitly disposed.
//!
//! The tracking core never inspects host object shape. Whatever object-model
//! layer sits above (accessor generation, macros, hand-written getters) must
//! funnel every read of a tracked property through [`TrackedStorage::get`]
//! and every write through [`TrackedStorage::set`]; consumption and dirtying
//! happen in exactly those two places.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use tracing::{debug, trace};

use super::frame::consume_tag;
use crate::object::Value;
use crate::validate::{Tag, UpdatableState};

/// Stable identity for an owner registered with a [`TrackedStorage`].
///
/// Handles are issued per storage and never reused, even after disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    /// Get the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Identity of one cell: owner plus property key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CellKey {
    owner: ObjectHandle,
    key: Arc<str>,
}

/// One tracked cell: a raw value plus the updatable state backing its tag.
struct TrackedCell {
    value: RwLock<Value>,
    state: Arc<UpdatableState>,
}

impl TrackedCell {
    fn empty() -> Self {
        Self {
            value: RwLock::new(Value::Null),
            state: UpdatableState::new(),
        }
    }

    fn tag(&self) -> Tag {
        Tag::from_state(Arc::clone(&self.state))
    }
}

/// Arena of tracked cells, shared by every object registered with it.
///
/// The map is sharded, so concurrent hosts contend only on cells they
/// actually share; the cross-thread ordering of dirtying writes comes from
/// the global revision clock, not from this structure.
pub struct TrackedStorage {
    cells: DashMap<CellKey, Arc<TrackedCell>>,
    frozen: DashSet<ObjectHandle>,
    next_handle: AtomicU64,
}

impl TrackedStorage {
    /// Create an empty storage arena.
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
            frozen: DashSet::new(),
            next_handle: AtomicU64::new(0),
        }
    }

    /// Issue a stable handle for a new owner.
    pub fn register(&self) -> ObjectHandle {
        ObjectHandle(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Read the raw value of a property, consuming its tag into the
    /// innermost open frame on this thread.
    ///
    /// The cell is created on first access; a property that was never
    /// written reads as [`Value::Null`]. Reading outside any frame is legal
    /// and consumes into nothing.
    pub fn get(&self, owner: ObjectHandle, key: &str) -> Value {
        let cell = self.cell(owner, key);
        consume_tag(&cell.tag());
        let value = cell.value.read().clone();
        value
    }

    /// Read the raw value without consuming its tag.
    pub fn peek(&self, owner: ObjectHandle, key: &str) -> Value {
        self.cell(owner, key).value.read().clone()
    }

    /// Store a new value and dirty the cell's tag.
    ///
    /// Writes against a frozen owner are tolerated as silent no-ops: the
    /// storage layer cannot always assume the mutation is observable, and a
    /// frozen target must never raise.
    pub fn set(&self, owner: ObjectHandle, key: &str, value: Value) {
        if self.is_frozen(owner) {
            debug!(owner = owner.raw(), key, "write to frozen owner ignored");
            return;
        }
        let cell = self.cell(owner, key);
        *cell.value.write() = value;
        let revision = cell.state.mark_dirty();
        trace!(
            owner = owner.raw(),
            key,
            revision = revision.raw(),
            "cell dirtied"
        );
    }

    /// Store a new value without dirtying the tag.
    ///
    /// This is the plain-data path for fields never declared tracked: the
    /// cell's tag stays at whatever revision it had, so the write is never
    /// observable through validation.
    pub fn set_untracked(&self, owner: ObjectHandle, key: &str, value: Value) {
        if self.is_frozen(owner) {
            debug!(owner = owner.raw(), key, "write to frozen owner ignored");
            return;
        }
        *self.cell(owner, key).value.write() = value;
    }

    /// The updatable tag backing a property.
    ///
    /// Idempotent per (owner, key): repeated lookups return the same
    /// underlying state, including for frozen owners.
    pub fn tag_for(&self, owner: ObjectHandle, key: &str) -> Tag {
        self.cell(owner, key).tag()
    }

    /// Freeze an owner. Subsequent writes through this storage become
    /// tolerated no-ops; existing tags keep validating indefinitely unless
    /// they were dirtied before the freeze.
    pub fn freeze(&self, owner: ObjectHandle) {
        self.frozen.insert(owner);
    }

    /// Whether an owner has been frozen.
    pub fn is_frozen(&self, owner: ObjectHandle) -> bool {
        self.frozen.contains(&owner)
    }

    /// Reclaim every cell belonging to an owner.
    ///
    /// Handles are never reused; an owner accessed again after disposal
    /// simply repopulates fresh cells at the initial revision.
    pub fn dispose(&self, owner: ObjectHandle) {
        self.cells.retain(|cell_key, _| cell_key.owner != owner);
        self.frozen.remove(&owner);
        debug!(owner = owner.raw(), "owner disposed");
    }

    /// Number of live cells in the arena.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn cell(&self, owner: ObjectHandle, key: &str) -> Arc<TrackedCell> {
        let cell_key = CellKey {
            owner,
            key: Arc::from(key),
        };
        if let Some(cell) = self.cells.get(&cell_key) {
            return Arc::clone(&cell);
        }
        let entry = self.cells.entry(cell_key).or_insert_with(|| {
            trace!(owner = owner.raw(), key, "tracked cell created");
            Arc::new(TrackedCell::empty())
        });
        Arc::clone(&entry)
    }
}

impl Default for TrackedStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TrackedStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedStorage")
            .field("cells", &self.cells.len())
            .field("frozen", &self.frozen.len())
            .finish()
    }
}
