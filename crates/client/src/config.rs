//! Viewer configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Playback timing and connection settings for the viewer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterpolationConfig {
    /// Expected time between two server snapshots.
    #[serde(default = "default_tick_period")]
    pub tick_period_ms: f64,
    /// Extra delay added on top of the tick period to absorb jitter.
    #[serde(default = "default_slack")]
    pub slack_ms: f64,
    /// How far a new render point follows the actual arrival time (0 = keep
    /// the schedule, 1 = follow arrivals).
    #[serde(default = "default_flexibility")]
    pub flexibility: f64,
    /// Frames per second.
    #[serde(default = "default_draw_rate")]
    pub draw_rate: u32,
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period(),
            slack_ms: default_slack(),
            flexibility: default_flexibility(),
            draw_rate: default_draw_rate(),
            server_url: default_server_url(),
        }
    }
}

fn default_tick_period() -> f64 {
    40.0
}
fn default_slack() -> f64 {
    20.0
}
fn default_flexibility() -> f64 {
    0.2
}
fn default_draw_rate() -> u32 {
    60
}
fn default_server_url() -> String {
    "ws://127.0.0.1:4000".to_string()
}

impl InterpolationConfig {
    /// Load configuration from `viewer.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("viewer.toml"))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.flexibility) {
            anyhow::bail!("flexibility must be within [0, 1], got {}", self.flexibility);
        }
        if self.tick_period_ms <= 0.0 || self.slack_ms < 0.0 {
            anyhow::bail!("tick_period_ms must be positive and slack_ms non-negative");
        }
        if self.draw_rate == 0 {
            anyhow::bail!("draw_rate must be at least 1");
        }
        Ok(())
    }
}
