//! Player record.

use super::ObjectId;
use glam::Vec2;

/// Slot number in the player pool.
pub type PlayerId = u32;

/// A player and the cell it controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub cell_id: ObjectId,
    /// Where the cell should head. `None` means stand still.
    pub target: Option<Vec2>,
}

impl Player {
    pub fn new(id: PlayerId, cell_id: ObjectId) -> Self {
        Self {
            id,
            cell_id,
            target: None,
        }
    }
}
