//! Game entities.
//!
//! Cells and food particles are the circular objects stored in the world's
//! object maps; a player is the link between a session and its cell.

mod cell;
mod food;
mod player;

pub use cell::{move_towards, Cell};
pub use food::FoodParticle;
pub use player::{Player, PlayerId};

/// Identifier of a cell or food particle.
pub type ObjectId = u32;
