//! blobfield viewer library.
//!
//! Turns the server's per-tick snapshots into smooth playback:
//! - `state`: viewer-side world copy and interpolation helpers
//! - `interpolation`: the snapshot jitter buffer
//! - `viewer`: a headless WebSocket viewer driving the buffer

pub mod config;
pub mod interpolation;
pub mod state;
pub mod viewer;

pub use config::InterpolationConfig;
pub use interpolation::InterpolationBuffer;
pub use state::{CameraView, CellView, FoodView, GameStateView};
