//! Keyed collection of circular objects backed by a [`QuadTree`].
//!
//! Every object handed to the map is copied on the way in and every read
//! returns a copy, so nothing outside can hold a live reference into the
//! map. A stored object is never changed in place: to update one, `add` it
//! again under the same id.

use super::quadtree::{Bounds, Locatable, QuadTree};
use crate::collision::circles_intersect;
use glam::Vec2;
use std::collections::HashMap;

/// Capability set an entity needs to live in an [`ObjectMap`].
pub trait CircularObject: Clone {
    fn id(&self) -> u32;
    fn position(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// What the tree stores for each object: enough to route and filter
/// candidates without touching the full entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadItem {
    pub id: u32,
    pub position: Vec2,
    pub radius: f32,
}

impl QuadItem {
    #[inline]
    pub fn of<T: CircularObject>(object: &T) -> Self {
        Self {
            id: object.id(),
            position: object.position(),
            radius: object.radius(),
        }
    }
}

impl Locatable for QuadItem {
    #[inline]
    fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// Spatial collection with identity lookup.
#[derive(Debug)]
pub struct ObjectMap<T> {
    objects: HashMap<u32, T>,
    tree: QuadTree<QuadItem>,
}

impl<T: CircularObject> ObjectMap<T> {
    /// Create a map covering the rectangle with top-left corner `origin`.
    ///
    /// Objects outside the rectangle (or right on its edge) are still stored
    /// and found; they just end up in the outermost leaves.
    pub fn new(origin: Vec2, width: f32, height: f32) -> Self {
        Self {
            objects: HashMap::new(),
            tree: QuadTree::new(Bounds::from_origin(origin, width, height)),
        }
    }

    /// Store a copy of `object`, replacing any entry with the same id.
    pub fn add(&mut self, object: &T) {
        self.remove(object.id());

        let copy = object.clone();
        self.tree.insert(QuadItem::of(&copy));
        self.objects.insert(copy.id(), copy);
    }

    /// Remove the object with the given id. Does nothing if it is absent.
    pub fn remove(&mut self, id: u32) -> Option<T> {
        let object = self.objects.remove(&id)?;
        self.tree.remove(&QuadItem::of(&object));
        Some(object)
    }

    /// A copy of the object with the given id.
    #[inline]
    pub fn get(&self, id: u32) -> Option<T> {
        self.objects.get(&id).cloned()
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.objects.contains_key(&id)
    }

    /// Copies of every stored object, in no particular order.
    pub fn get_all(&self) -> Vec<T> {
        self.objects.values().cloned().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects intersecting `subject` that it is allowed to consume.
    ///
    /// A candidate qualifies when it is not the subject itself, the two circles
    /// overlap, and it is either strictly smaller or the same size with a
    /// lower id. Running this for every member of a population reports each
    /// intersecting pair exactly once.
    ///
    /// The subject does not have to be stored in the map.
    pub fn find_smaller_intersecting<P: CircularObject>(&self, subject: &P) -> Vec<T> {
        let id = subject.id();
        let center = subject.position();
        let radius = subject.radius();

        // A qualifying candidate is no larger than the subject, so its center
        // lies within 2 * radius on both axes.
        let window = radius * 2.0;

        self.tree
            .find_in_rect(center.x, center.y, window, window)
            .into_iter()
            .filter(|item| {
                item.id != id
                    && circles_intersect(item.position, item.radius, center, radius)
                    && (item.radius < radius || (item.radius == radius && item.id < id))
            })
            .filter_map(|item| self.objects.get(&item.id).cloned())
            .collect()
    }

    /// Number of nodes in the underlying tree.
    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }
}
