//! Path Reference Chains
//!
//! A path chain resolves `root.a.b.c` as a sequence of independently
//! memoized hops. Each hop reads one key off its parent's current value, so
//! dirtying a cell deep in the graph invalidates exactly the hops downstream
//! of it and nothing else.

use std::fmt;
use std::sync::Arc;

use crate::object::{Object, Value};
use crate::track::consume_tag;
use crate::validate::CONSTANT_TAG;

use super::memo::MemoizedReference;

/// Anything a path hop can read a value from.
pub trait Reference: Send + Sync {
    /// Current value of this reference.
    fn value(&self) -> Value;
}

/// Entry point for building a path-reference chain over an object graph.
pub fn state(object: Object) -> RootReference {
    RootReference::new(object)
}

/// Constant reference to the root of an object graph.
///
/// The root's identity never changes; only properties hanging off it do,
/// so reading the root consumes nothing.
#[derive(Clone)]
pub struct RootReference {
    object: Object,
}

impl RootReference {
    pub fn new(object: Object) -> Self {
        Self { object }
    }

    /// Child reference for one property of the root.
    pub fn get(&self, key: &str) -> PathReference {
        PathReference::new(Arc::new(self.clone()), key)
    }
}

impl Reference for RootReference {
    fn value(&self) -> Value {
        Value::Object(self.object.clone())
    }
}

impl fmt::Debug for RootReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootReference")
            .field("object", &self.object)
            .finish()
    }
}

/// One memoized hop of a property path.
///
/// Cloning shares the hop's cache.
#[derive(Clone)]
pub struct PathReference {
    key: Arc<str>,
    memo: MemoizedReference<Value>,
}

impl PathReference {
    fn new(parent: Arc<dyn Reference>, key: &str) -> Self {
        let key: Arc<str> = Arc::from(key);
        let segment = Arc::clone(&key);
        let memo = MemoizedReference::new(move || resolve(parent.as_ref(), &segment));
        Self { key, memo }
    }

    /// The property key this hop resolves.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Child reference for a nested property.
    pub fn get(&self, key: &str) -> PathReference {
        PathReference::new(Arc::new(self.clone()), key)
    }
}

impl Reference for PathReference {
    fn value(&self) -> Value {
        self.memo.value()
    }
}

impl fmt::Debug for PathReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathReference")
            .field("key", &self.key)
            .finish()
    }
}

/// Read `key` off the parent's current value.
///
/// A parent value with no property identity (anything that is not an
/// object) resolves to null under the constant tag; reading through it never
/// raises.
fn resolve(parent: &dyn Reference, key: &str) -> Value {
    match parent.value() {
        Value::Object(object) => object.get(key),
        _ => {
            consume_tag(&CONSTANT_TAG);
            Value::Null
        }
    }
}
