//! Shapes and objects: the declaration layer over tracked storage.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use super::value::Value;
use crate::track::{ObjectHandle, TrackedStorage};
use crate::validate::Tag;

/// Declaration of which property keys of a type are tracked.
///
/// Shapes are shared across instances (`Arc<Shape>`), the way a
/// prototype-level annotation is: marking a key tracked affects every object
/// created with the shape, while cells remain strictly per instance. Keys
/// never marked here still resolve to a tag on read, but ordinary writes to
/// them never dirty it.
#[derive(Debug, Default)]
pub struct Shape {
    tracked: IndexSet<Arc<str>>,
}

impl Shape {
    /// Create a shape with no tracked keys.
    pub fn new() -> Self {
        Self {
            tracked: IndexSet::new(),
        }
    }

    /// Declare `key` as tracked: reads and writes of it route through the
    /// dirtying path and participate in invalidation.
    pub fn mark_tracked(&mut self, key: &str) -> &mut Self {
        self.tracked.insert(Arc::from(key));
        self
    }

    /// Whether `key` was declared tracked.
    pub fn is_tracked(&self, key: &str) -> bool {
        self.tracked.contains(key)
    }
}

/// A host object registered with a storage arena.
///
/// Cloning shares identity: clones read and write the same cells, and
/// equality is handle identity, not structure.
#[derive(Clone)]
pub struct Object {
    inner: Arc<ObjectInner>,
}

struct ObjectInner {
    storage: Arc<TrackedStorage>,
    shape: Arc<Shape>,
    handle: ObjectHandle,
}

impl Object {
    /// Register a new object with `storage` under the given shape.
    pub fn new(storage: Arc<TrackedStorage>, shape: Arc<Shape>) -> Self {
        let handle = storage.register();
        Self {
            inner: Arc::new(ObjectInner {
                storage,
                shape,
                handle,
            }),
        }
    }

    /// The storage handle backing this object.
    pub fn handle(&self) -> ObjectHandle {
        self.inner.handle
    }

    /// The storage arena this object registered with.
    pub fn storage(&self) -> &Arc<TrackedStorage> {
        &self.inner.storage
    }

    /// Read a property, consuming its tag into the innermost open frame.
    pub fn get(&self, key: &str) -> Value {
        self.inner.storage.get(self.inner.handle, key)
    }

    /// Read a property without consuming its tag.
    pub fn peek(&self, key: &str) -> Value {
        self.inner.storage.peek(self.inner.handle, key)
    }

    /// Write a property.
    ///
    /// Tracked keys dirty the cell's tag. Keys never declared tracked are
    /// stored without dirtying, so the write is not observable through
    /// validation.
    pub fn set(&self, key: &str, value: Value) {
        if self.inner.shape.is_tracked(key) {
            self.inner.storage.set(self.inner.handle, key, value);
        } else {
            self.inner.storage.set_untracked(self.inner.handle, key, value);
        }
    }

    /// The updatable tag backing a property. Idempotent per key.
    pub fn tag_for(&self, key: &str) -> Tag {
        self.inner.storage.tag_for(self.inner.handle, key)
    }

    /// Freeze this object: later writes become tolerated no-ops.
    pub fn freeze(&self) {
        self.inner.storage.freeze(self.inner.handle);
    }

    /// Whether this object has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.inner.storage.is_frozen(self.inner.handle)
    }

    /// Reclaim this object's cells from the arena.
    pub fn dispose(&self) {
        self.inner.storage.dispose(self.inner.handle);
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Object) -> bool {
        self.inner.handle == other.inner.handle
            && Arc::ptr_eq(&self.inner.storage, &other.inner.storage)
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("handle", &self.inner.handle.raw())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::track;

    fn person_shape() -> Arc<Shape> {
        let mut shape = Shape::new();
        shape.mark_tracked("first_name").mark_tracked("last_name");
        Arc::new(shape)
    }

    #[test]
    fn shapes_know_their_tracked_keys() {
        let shape = person_shape();
        assert!(shape.is_tracked("first_name"));
        assert!(shape.is_tracked("last_name"));
        assert!(!shape.is_tracked("nickname"));
    }

    #[test]
    fn tracked_writes_dirty_and_untracked_writes_do_not() {
        let storage = Arc::new(TrackedStorage::new());
        let person = Object::new(Arc::clone(&storage), person_shape());

        let tracked_tag = person.tag_for("first_name");
        let plain_tag = person.tag_for("nickname");
        let tracked_snapshot = tracked_tag.value();
        let plain_snapshot = plain_tag.value();

        person.set("first_name", "Tom".into());
        person.set("nickname", "tommy".into());

        assert!(!tracked_tag.validate(tracked_snapshot));
        // The undeclared key behaves observably as a constant.
        assert!(plain_tag.validate(plain_snapshot));
        assert_eq!(person.peek("nickname").as_str(), Some("tommy"));
    }

    #[test]
    fn get_consumes_and_peek_does_not() {
        let storage = Arc::new(TrackedStorage::new());
        let person = Object::new(Arc::clone(&storage), person_shape());
        person.set("first_name", "Tom".into());

        let (_, tag) = track(|| person.get("first_name"));
        assert!(!tag.is_constant());

        let (_, tag) = track(|| person.peek("first_name"));
        assert!(tag.is_constant());
    }

    #[test]
    fn reading_outside_any_frame_never_raises() {
        let storage = Arc::new(TrackedStorage::new());
        let person = Object::new(Arc::clone(&storage), person_shape());

        assert!(person.get("first_name").is_null());
        person.set("first_name", "Tom".into());
        assert_eq!(person.get("first_name").as_str(), Some("Tom"));
    }

    #[test]
    fn clones_share_identity_and_cells() {
        let storage = Arc::new(TrackedStorage::new());
        let person = Object::new(Arc::clone(&storage), person_shape());
        let alias = person.clone();

        assert_eq!(person, alias);
        alias.set("first_name", "Tom".into());
        assert_eq!(person.get("first_name").as_str(), Some("Tom"));
    }

    #[test]
    fn distinct_instances_of_one_shape_have_distinct_cells() {
        let storage = Arc::new(TrackedStorage::new());
        let shape = person_shape();
        let first = Object::new(Arc::clone(&storage), Arc::clone(&shape));
        let second = Object::new(Arc::clone(&storage), shape);

        assert_ne!(first, second);
        first.set("first_name", "Tom".into());
        assert!(second.get("first_name").is_null());
        assert_ne!(first.tag_for("first_name"), second.tag_for("first_name"));
    }

    #[test]
    fn freeze_is_visible_through_the_object() {
        let storage = Arc::new(TrackedStorage::new());
        let person = Object::new(Arc::clone(&storage), person_shape());
        person.set("first_name", "Tom".into());

        person.freeze();
        assert!(person.is_frozen());

        person.set("first_name", "Edsger".into());
        assert_eq!(person.get("first_name").as_str(), Some("Tom"));
    }
}
