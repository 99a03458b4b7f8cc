//! Spatial indexing utilities.
//!
//! A depth-capped QuadTree plus an id-keyed object map layered on top of it.

mod object_map;
mod quadtree;

pub use object_map::{CircularObject, ObjectMap, QuadItem};
pub use quadtree::{Bounds, Locatable, QuadTree, MAX_DEPTH, SPLIT_THRESHOLD};
