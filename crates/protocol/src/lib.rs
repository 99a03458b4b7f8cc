//! Shared protocol crate for blobfield.
//!
//! This crate contains:
//! - Message definitions for both directions (tagged JSON)
//! - Shared wire types (Point, camera, cell and food states)
//! - Encoding/decoding helpers

mod error;
pub mod messages;

pub use error::ProtocolError;
pub use messages::{
    CameraState, CellState, ClientMessage, FoodState, GameUpdate, JoinGameResponse, ServerMessage,
};

/// Area covered by one unit of mass.
pub const MASS_TO_AREA: f32 = 200.0;

/// Radius of a cell with the given mass.
/// radius = sqrt(mass * MASS_TO_AREA / PI)
#[inline]
pub fn mass_to_radius(mass: f32) -> f32 {
    (mass * MASS_TO_AREA / std::f32::consts::PI).sqrt()
}

/// A position in world coordinates as it travels on the wire (`{x, y}`).
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns true when both coordinates are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<glam::Vec2> for Point {
    #[inline]
    fn from(v: glam::Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for glam::Vec2 {
    #[inline]
    fn from(p: Point) -> Self {
        glam::Vec2::new(p.x, p.y)
    }
}
