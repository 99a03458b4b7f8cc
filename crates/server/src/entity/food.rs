//! Food pellet.

use super::ObjectId;
use crate::spatial::CircularObject;
use glam::Vec2;
use protocol::FoodState;

/// A static food particle that cells consume on contact.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodParticle {
    pub id: ObjectId,
    pub position: Vec2,
    pub radius: f32,
    /// 0-255 color hint.
    pub hue: u8,
}

impl FoodParticle {
    pub fn new(id: ObjectId, position: Vec2, radius: f32, hue: u8) -> Self {
        Self {
            id,
            position,
            radius,
            hue,
        }
    }

    pub fn to_state(&self) -> FoodState {
        FoodState {
            id: self.id,
            position: self.position.into(),
            hue: self.hue,
        }
    }
}

impl CircularObject for FoodParticle {
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
        self.radius
    }
}
