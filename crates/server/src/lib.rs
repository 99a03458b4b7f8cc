//! blobfield game server library.

pub mod collision;
pub mod config;
pub mod entity;
pub mod server;
pub mod spatial;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use server::{run, run_game_loop, GameState, WorldUpdateBroadcast};
pub use world::{JoinError, TickSummary, World, WorldError};
