//! Viewer-side copy of the world, built from `gameUpdate` snapshots.

use glam::Vec2;
use protocol::{CameraState, CellState, FoodState, GameUpdate};
use std::collections::HashMap;

/// Linear interpolation between two values.
///
/// Written as `a * (1 - t) + b * t` so `t = 0` gives `a` and `t = 1` gives `b`
/// exactly.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Component-wise [`lerp`] for points.
#[inline]
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    Vec2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec2,
    pub view_area_width: f32,
}

impl From<CameraState> for CameraView {
    fn from(camera: CameraState) -> Self {
        Self {
            position: camera.position.into(),
            view_area_width: camera.view_area_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellView {
    pub id: u32,
    pub position: Vec2,
    pub mass: f32,
    /// Derived from `mass` when the snapshot arrives, then interpolated on its own.
    pub radius: f32,
}

impl From<CellState> for CellView {
    fn from(cell: CellState) -> Self {
        Self {
            id: cell.id,
            position: cell.position.into(),
            mass: cell.mass,
            radius: cell.radius(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodView {
    pub id: u32,
    pub position: Vec2,
    pub hue: u8,
}

impl From<FoodState> for FoodView {
    fn from(food: FoodState) -> Self {
        Self {
            id: food.id,
            position: food.position.into(),
            hue: food.hue,
        }
    }
}

/// A renderable world state: one snapshot, or a blend of two.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStateView {
    pub camera: CameraView,
    pub cells: HashMap<u32, CellView>,
    pub food: HashMap<u32, FoodView>,
}

impl From<GameUpdate> for GameStateView {
    fn from(update: GameUpdate) -> Self {
        Self {
            camera: update.camera.into(),
            cells: update
                .cells
                .into_iter()
                .map(|c| (c.id, CellView::from(c)))
                .collect(),
            food: update
                .food_particles
                .into_iter()
                .map(|f| (f.id, FoodView::from(f)))
                .collect(),
        }
    }
}

impl GameStateView {
    /// Blend `from` toward `to` by `t` in `[0, 1]`.
    ///
    /// Only ids present in both states are kept. Numeric fields are
    /// interpolated; the hue comes from `from`.
    pub fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        let camera = CameraView {
            position: lerp_vec2(from.camera.position, to.camera.position, t),
            view_area_width: lerp(from.camera.view_area_width, to.camera.view_area_width, t),
        };

        let cells = from
            .cells
            .iter()
            .filter_map(|(id, a)| {
                let b = to.cells.get(id)?;
                Some((
                    *id,
                    CellView {
                        id: *id,
                        position: lerp_vec2(a.position, b.position, t),
                        mass: lerp(a.mass, b.mass, t),
                        radius: lerp(a.radius, b.radius, t),
                    },
                ))
            })
            .collect();

        let food = from
            .food
            .iter()
            .filter_map(|(id, a)| {
                let b = to.food.get(id)?;
                Some((
                    *id,
                    FoodView {
                        id: *id,
                        position: lerp_vec2(a.position, b.position, t),
                        hue: a.hue,
                    },
                ))
            })
            .collect();

        Self { camera, cells, food }
    }
}
