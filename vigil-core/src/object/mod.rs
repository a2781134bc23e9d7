//! Host-Facing Object Model
//!
//! A thin declaration layer over tracked storage. Shapes declare which
//! property keys of a type participate in invalidation; objects pair a
//! shape with a storage handle so that every read and write of a tracked
//! property funnels through the storage's consume/dirty choke points.
//!
//! Values move between cells and references as a tagged union. The engine
//! itself never looks inside them beyond distinguishing nested objects from
//! everything else.

mod model;
mod value;

pub use model::{Object, Shape};
pub use value::Value;
