//! Circle geometry used by consumption checks.
//!
//! Overlap means absorption: there is no push-apart or bounce.

use glam::Vec2;

pub use protocol::{mass_to_radius, MASS_TO_AREA};

/// Two circles intersect when their centers are strictly closer than the sum
/// of their radii. Touching circles do not intersect.
#[inline]
pub fn circles_intersect(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_radius_conversion() {
        let radius = mass_to_radius(100.0);
        assert!((radius - 79.788).abs() < 0.01);
        let area = std::f32::consts::PI * radius * radius;
        assert!((area / MASS_TO_AREA - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_radius_grows_with_mass() {
        let mut last = 0.0;
        for mass in [1.0, 10.0, 100.0, 110.0, 1000.0] {
            let r = mass_to_radius(mass);
            assert!(r > last);
            last = r;
        }
    }

    #[test]
    fn test_collision_check() {
        // 50 + 20 = 70, distance = 30
        assert!(circles_intersect(Vec2::ZERO, 50.0, Vec2::new(30.0, 0.0), 20.0));
    }

    #[test]
    fn test_touching_is_not_colliding() {
        assert!(!circles_intersect(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0));
        assert!(!circles_intersect(Vec2::ZERO, 10.0, Vec2::new(100.0, 0.0), 10.0));
    }
}
