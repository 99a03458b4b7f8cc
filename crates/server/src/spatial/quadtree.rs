//! QuadTree for spatial indexing.
//!
//! A recursive partition of a centered rectangle. Objects live in leaves; a
//! leaf splits into four quadrants once it holds more than [`SPLIT_THRESHOLD`]
//! objects (unless it is already at [`MAX_DEPTH`]), and an internal node whose
//! children are all leaves collapses back into a single leaf as soon as their
//! combined object count drops to the threshold again.
//!
//! The position of a resident object must not change. To move one, remove it
//! and insert it again.

use glam::Vec2;

/// Object count above which a leaf splits.
pub const SPLIT_THRESHOLD: usize = 4;
/// Depth at which leaves stop splitting and hold any number of objects.
pub const MAX_DEPTH: u32 = 3;

/// Anything with a stable identity and a fixed position.
pub trait Locatable {
    fn id(&self) -> u32;
    fn position(&self) -> Vec2;
}

/// Axis-aligned rectangle described by its center and half extents.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub center: Vec2,
    pub extent: Vec2,
}

impl Bounds {
    pub fn new(center_x: f32, center_y: f32, extent_x: f32, extent_y: f32) -> Self {
        Self {
            center: Vec2::new(center_x, center_y),
            extent: Vec2::new(extent_x, extent_y),
        }
    }

    /// Bounds covering the rectangle with top-left corner `origin`.
    pub fn from_origin(origin: Vec2, width: f32, height: f32) -> Self {
        let extent = Vec2::new(width / 2.0, height / 2.0);
        Self {
            center: origin + extent,
            extent,
        }
    }

    /// Strict overlap test: rectangles that only touch do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        (self.center.x - other.center.x).abs() < self.extent.x + other.extent.x
            && (self.center.y - other.center.y).abs() < self.extent.y + other.extent.y
    }

    /// Strict interior containment: points on the edge are outside.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() < self.extent.x
            && (point.y - self.center.y).abs() < self.extent.y
    }

    /// The quadrant a point routes to: bit 0 set for the right half, bit 1
    /// for the lower half (larger y). Points on a splitting line go right/down.
    #[inline]
    fn quadrant_of(&self, point: Vec2) -> usize {
        let right = usize::from(point.x >= self.center.x);
        let down = usize::from(point.y >= self.center.y);
        down * 2 + right
    }

    fn quadrant(&self, index: usize) -> Bounds {
        let half = self.extent / 2.0;
        let sign_x = if index & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if index & 2 == 0 { -1.0 } else { 1.0 };
        Bounds {
            center: self.center + Vec2::new(sign_x * half.x, sign_y * half.y),
            extent: half,
        }
    }
}

#[derive(Debug)]
enum Node<T> {
    Leaf(Vec<T>),
    Internal(Box<[QuadTree<T>; 4]>),
}

/// A node of the tree (the root is a node too).
#[derive(Debug)]
pub struct QuadTree<T> {
    bounds: Bounds,
    depth: u32,
    node: Node<T>,
}

impl<T: Locatable> QuadTree<T> {
    /// Create an empty tree covering `bounds`.
    pub fn new(bounds: Bounds) -> Self {
        Self::with_depth(bounds, 0)
    }

    fn with_depth(bounds: Bounds, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            node: Node::Leaf(Vec::new()),
        }
    }

    /// The rectangle this node covers.
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.node, Node::Leaf(_))
    }

    /// Number of objects stored in this subtree.
    pub fn len(&self) -> usize {
        match &self.node {
            Node::Leaf(objects) => objects.len(),
            Node::Internal(children) => children.iter().map(QuadTree::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        match &self.node {
            Node::Leaf(_) => 1,
            Node::Internal(children) => 1 + children.iter().map(QuadTree::node_count).sum::<usize>(),
        }
    }

    pub fn insert(&mut self, object: T) {
        match &mut self.node {
            Node::Leaf(objects) => {
                objects.push(object);
                if objects.len() > SPLIT_THRESHOLD && self.depth < MAX_DEPTH {
                    self.split();
                }
            }
            Node::Internal(children) => {
                let index = self.bounds.quadrant_of(object.position());
                children[index].insert(object);
            }
        }
    }

    /// Remove the object with the same identity as `object`, following the
    /// route its position gives. Returns the removed object.
    pub fn remove(&mut self, object: &T) -> Option<T> {
        let removed = match &mut self.node {
            Node::Leaf(objects) => {
                let id = object.id();
                let index = objects.iter().position(|o| o.id() == id)?;
                return Some(objects.swap_remove(index));
            }
            Node::Internal(children) => {
                let index = self.bounds.quadrant_of(object.position());
                children[index].remove(object)
            }
        };

        if removed.is_some() && self.can_merge() {
            self.merge();
        }
        removed
    }

    /// All objects strictly inside the centered query rectangle.
    pub fn find_in_rect(&self, center_x: f32, center_y: f32, extent_x: f32, extent_y: f32) -> Vec<&T> {
        let query = Bounds::new(center_x, center_y, extent_x, extent_y);
        let mut found = Vec::new();
        self.collect_in(&query, &mut found);
        found
    }

    fn collect_in<'a>(&'a self, query: &Bounds, found: &mut Vec<&'a T>) {
        if !self.bounds.intersects(query) {
            return;
        }
        match &self.node {
            Node::Leaf(objects) => {
                found.extend(objects.iter().filter(|o| query.contains(o.position())));
            }
            Node::Internal(children) => {
                for child in children.iter() {
                    child.collect_in(query, found);
                }
            }
        }
    }

    fn split(&mut self) {
        let objects = match std::mem::replace(&mut self.node, Node::Leaf(Vec::new())) {
            Node::Leaf(objects) => objects,
            internal => {
                self.node = internal;
                return;
            }
        };

        let depth = self.depth + 1;
        let bounds = self.bounds;
        let mut children: Box<[QuadTree<T>; 4]> = Box::new(std::array::from_fn(|i| {
            QuadTree::with_depth(bounds.quadrant(i), depth)
        }));
        for object in objects {
            let index = bounds.quadrant_of(object.position());
            children[index].insert(object);
        }
        self.node = Node::Internal(children);
    }

    fn can_merge(&self) -> bool {
        match &self.node {
            Node::Leaf(_) => false,
            Node::Internal(children) => {
                let mut combined = 0;
                for child in children.iter() {
                    match &child.node {
                        Node::Leaf(objects) => combined += objects.len(),
                        Node::Internal(_) => return false,
                    }
                }
                combined <= SPLIT_THRESHOLD
            }
        }
    }

    fn merge(&mut self) {
        let Node::Internal(children) = std::mem::replace(&mut self.node, Node::Leaf(Vec::new())) else {
            return;
        };
        let mut objects = Vec::with_capacity(SPLIT_THRESHOLD);
        for child in *children {
            if let Node::Leaf(child_objects) = child.node {
                objects.extend(child_objects);
            }
        }
        self.node = Node::Leaf(objects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    #[derive(Debug, Clone, PartialEq)]
    struct Dot {
        id: u32,
        at: Vec2,
    }

    impl Locatable for Dot {
        fn id(&self) -> u32 {
            self.id
        }
        fn position(&self) -> Vec2 {
            self.at
        }
    }

    fn dot(id: u32, x: f32, y: f32) -> Dot {
        Dot { id, at: Vec2::new(x, y) }
    }

    fn world() -> QuadTree<Dot> {
        QuadTree::new(Bounds::from_origin(Vec2::ZERO, 1000.0, 800.0))
    }

    fn sorted_ids(found: Vec<&Dot>) -> Vec<u32> {
        let mut ids: Vec<u32> = found.into_iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_bounds_intersects() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(15.0, 15.0, 10.0, 10.0);
        let touching = Bounds::new(20.0, 0.0, 10.0, 10.0);
        let far = Bounds::new(50.0, 50.0, 10.0, 10.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&touching));
        assert!(!a.intersects(&far));
    }

    #[test]
    fn test_bounds_contains_is_strict() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(Vec2::new(9.9, -9.9)));
        assert!(!b.contains(Vec2::new(10.0, 0.0)));
        assert!(!b.contains(Vec2::new(0.0, -10.0)));
    }

    #[test]
    fn test_routing_on_split_lines() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(b.quadrant_of(Vec2::new(-1.0, -1.0)), 0);
        assert_eq!(b.quadrant_of(Vec2::new(0.0, -1.0)), 1);
        assert_eq!(b.quadrant_of(Vec2::new(-1.0, 0.0)), 2);
        assert_eq!(b.quadrant_of(Vec2::new(0.0, 0.0)), 3);
    }

    #[test]
    fn test_split_after_threshold() {
        let mut tree = world();
        for i in 0..SPLIT_THRESHOLD as u32 {
            tree.insert(dot(i, 100.0 + i as f32 * 200.0, 100.0));
        }
        assert!(tree.is_leaf());

        tree.insert(dot(99, 900.0, 700.0));
        assert!(!tree.is_leaf());
        assert_eq!(tree.len(), SPLIT_THRESHOLD + 1);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_max_depth_leaf_holds_everything() {
        let mut tree = world();
        // All at the same point: splitting cannot separate them.
        for i in 0..50 {
            tree.insert(dot(i, 10.0, 10.0));
        }
        assert_eq!(tree.len(), 50);
        // One chain of splits down to MAX_DEPTH, four nodes per level below the root.
        assert_eq!(tree.node_count(), 1 + 4 * MAX_DEPTH as usize);
        assert_eq!(tree.find_in_rect(10.0, 10.0, 1.0, 1.0).len(), 50);
    }

    #[test]
    fn test_find_in_rect() {
        let mut tree = world();
        tree.insert(dot(1, 100.0, 100.0));
        tree.insert(dot(2, 500.0, 400.0));
        tree.insert(dot(3, 520.0, 410.0));
        tree.insert(dot(4, 900.0, 700.0));
        tree.insert(dot(5, 110.0, 90.0));
        tree.insert(dot(6, 480.0, 390.0));

        assert_eq!(sorted_ids(tree.find_in_rect(500.0, 400.0, 30.0, 30.0)), vec![2, 3, 6]);
        assert_eq!(sorted_ids(tree.find_in_rect(100.0, 100.0, 20.0, 20.0)), vec![1, 5]);
        // Edge is exclusive.
        assert!(tree.find_in_rect(90.0, 100.0, 10.0, 50.0).is_empty());
        assert_eq!(sorted_ids(tree.find_in_rect(90.0, 100.0, 10.5, 50.0)), vec![1]);
    }

    #[test]
    fn test_full_rect_returns_population_any_order() {
        let mut rng = StdRng::seed_from_u64(17);
        // Interior points only: the world edge itself is outside a strict query.
        let mut dots: Vec<Dot> = (0..300)
            .map(|i| dot(i, rng.random_range(0.5..999.5), rng.random_range(0.5..799.5)))
            .collect();

        for _ in 0..3 {
            dots.shuffle(&mut rng);
            let mut tree = world();
            for d in &dots {
                tree.insert(d.clone());
            }
            let full = tree.bounds();
            let ids = sorted_ids(tree.find_in_rect(full.center.x, full.center.y, full.extent.x, full.extent.y));
            assert_eq!(ids, (0..300).collect::<Vec<u32>>());
        }
    }

    #[test]
    fn test_full_rect_excludes_world_edge() {
        let mut tree = world();
        tree.insert(dot(1, 0.0, 10.0));
        tree.insert(dot(2, 500.0, 400.0));
        tree.insert(dot(3, 1000.0, 800.0));
        assert_eq!(tree.bounds(), Bounds::new(500.0, 400.0, 500.0, 400.0));

        assert_eq!(sorted_ids(tree.find_in_rect(500.0, 400.0, 500.0, 400.0)), vec![2]);
        assert_eq!(tree.len(), 3);
        // A window centred near the edge still reaches them
        assert_eq!(sorted_ids(tree.find_in_rect(0.0, 10.0, 5.0, 5.0)), vec![1]);
        assert_eq!(sorted_ids(tree.find_in_rect(1000.0, 800.0, 5.0, 5.0)), vec![3]);
    }

    #[test]
    fn test_remove_uses_identity() {
        let mut tree = world();
        tree.insert(dot(1, 10.0, 10.0));
        tree.insert(dot(2, 10.0, 10.0));

        assert_eq!(tree.remove(&dot(2, 10.0, 10.0)), Some(dot(2, 10.0, 10.0)));
        assert_eq!(tree.remove(&dot(2, 10.0, 10.0)), None);
        assert_eq!(sorted_ids(tree.find_in_rect(10.0, 10.0, 5.0, 5.0)), vec![1]);
    }

    #[test]
    fn test_merge_back_to_single_leaf() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = world();
        let dots: Vec<Dot> = (0..64)
            .map(|i| dot(i, rng.random_range(0.0..1000.0), rng.random_range(0.0..800.0)))
            .collect();
        for d in &dots {
            tree.insert(d.clone());
        }
        assert!(!tree.is_leaf());

        for d in &dots[..dots.len() - 1] {
            assert!(tree.remove(d).is_some());
        }
        assert!(tree.is_leaf());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(sorted_ids(tree.find_in_rect(500.0, 400.0, 501.0, 401.0)), vec![63]);
    }

    #[test]
    fn test_node_count_tracks_occupancy() {
        let mut tree = world();
        let dots: Vec<Dot> = (0..20).map(|i| dot(i, (i * 50) as f32, (i * 40) as f32)).collect();
        for d in &dots {
            tree.insert(d.clone());
        }
        let grown = tree.node_count();
        assert!(grown > 1);

        for d in &dots[..16] {
            tree.remove(d);
        }
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_objects_are_kept() {
        let mut tree = world();
        for i in 0..10 {
            tree.insert(dot(i, -50.0 - i as f32, 2000.0));
        }
        tree.insert(dot(10, 1000.0, 800.0));
        assert_eq!(tree.len(), 11);
        assert!(tree.remove(&dot(3, -53.0, 2000.0)).is_some());
        assert_eq!(tree.len(), 10);
    }
}
