//! Player-controlled cell.

use super::ObjectId;
use crate::collision::mass_to_radius;
use crate::spatial::CircularObject;
use glam::Vec2;
use protocol::CellState;

/// A cell controlled by a player. Its radius is derived from its mass.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: ObjectId,
    /// Position in world coordinates.
    pub position: Vec2,
    pub mass: f32,
}

impl Cell {
    pub fn new(id: ObjectId, position: Vec2, mass: f32) -> Self {
        Self { id, position, mass }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        mass_to_radius(self.mass)
    }

    /// Step toward `target` by at most `step`.
    #[inline]
    pub fn move_towards(&mut self, target: Vec2, step: f32) {
        self.position = move_towards(self.position, target, step);
    }

    pub fn to_state(&self) -> CellState {
        CellState {
            id: self.id,
            position: self.position.into(),
            mass: self.mass,
        }
    }
}

impl CircularObject for Cell {
    #[inline]
    fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    fn radius(&self) -> f32 {
        Cell::radius(self)
    }
}

/// Advance `from` toward `target` by `step`.
///
/// When the target is within `step` the result is exactly the target, so
/// repeated steps converge without overshooting.
pub fn move_towards(from: Vec2, target: Vec2, step: f32) -> Vec2 {
    let delta = target - from;
    let distance = delta.length();

    if distance <= step {
        return target;
    }

    from + delta / distance * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_snaps_when_within_step() {
        let target = Vec2::new(10.0, 5.0);
        assert_eq!(move_towards(Vec2::new(0.0, 0.0), target, 20.0), target);
        assert_eq!(move_towards(target, target, 20.0), target);
    }

    #[test]
    fn test_moves_exactly_one_step() {
        let next = move_towards(Vec2::ZERO, Vec2::new(100.0, 0.0), 20.0);
        assert_eq!(next, Vec2::new(20.0, 0.0));

        let next = move_towards(Vec2::ZERO, Vec2::new(300.0, 400.0), 20.0);
        assert!((next.length() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut rng = StdRng::seed_from_u64(11);
        let step = 20.0;

        for _ in 0..200 {
            let mut position = Vec2::new(rng.random_range(0.0..10000.0), rng.random_range(0.0..8000.0));
            let target = Vec2::new(rng.random_range(0.0..10000.0), rng.random_range(0.0..8000.0));
            let bound = (position.distance(target) / step).ceil() as usize + 1;

            let mut ticks = 0;
            let mut remaining = position.distance(target);
            while position != target {
                position = move_towards(position, target, step);
                let now_remaining = position.distance(target);
                assert!(now_remaining <= remaining, "distance must never grow");
                remaining = now_remaining;
                ticks += 1;
                assert!(ticks <= bound, "took more than {bound} ticks");
            }
        }
    }

    #[test]
    fn test_cell_radius_follows_mass() {
        let mut cell = Cell::new(1, Vec2::ZERO, 100.0);
        let before = cell.radius();
        assert!((before - 79.79).abs() < 0.01);
        cell.mass += 10.0;
        assert!(cell.radius() > before);
    }

    #[test]
    fn test_cell_state() {
        let cell = Cell::new(4, Vec2::new(1.5, 2.5), 120.0);
        let state = cell.to_state();
        assert_eq!(state.id, 4);
        assert_eq!(state.position, protocol::Point::new(1.5, 2.5));
        assert_eq!(state.mass, 120.0);
    }
}
