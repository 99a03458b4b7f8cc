//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub border: BorderConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing the defaults there first if
    /// the file does not exist yet.
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
}

impl Config {
    /// Reject values the world and the tick loop cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.border.width > 0.0 && self.border.height > 0.0) {
            anyhow::bail!(
                "border must have a positive size, got {}x{}",
                self.border.width,
                self.border.height
            );
        }
        if self.server.tick_interval_ms == 0 {
            anyhow::bail!("tick_interval_ms must be at least 1");
        }
        if !(self.player.speed > 0.0) {
            anyhow::bail!("player speed must be positive, got {}", self.player.speed);
        }
        if !(self.player.start_mass > 0.0) {
            anyhow::bail!("player start_mass must be positive, got {}", self.player.start_mass);
        }
        if !(self.food.radius > 0.0) {
            anyhow::bail!("food radius must be positive, got {}", self.food.radius);
        }
        Ok(())
    }
}

/// Server networking and loop settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Tick interval in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Maximum number of concurrent players (size of the player id pool).
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Maximum open connections, players and spectators together.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            tick_interval_ms: default_tick_interval(),
            max_players: default_max_players(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_port() -> u16 {
    4000
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_tick_interval() -> u64 {
    40
}
fn default_max_players() -> usize {
    200
}
fn default_max_connections() -> usize {
    500
}

/// World border configuration. The world spans `(0, 0)` to `(width, height)`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BorderConfig {
    #[serde(default = "default_border_width")]
    pub width: f64,
    #[serde(default = "default_border_height")]
    pub height: f64,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            width: default_border_width(),
            height: default_border_height(),
        }
    }
}

fn default_border_width() -> f64 {
    10000.0
}
fn default_border_height() -> f64 {
    8000.0
}

/// Player configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_start_mass")]
    pub start_mass: f64,
    /// Distance a cell moves per tick.
    #[serde(default = "default_player_speed")]
    pub speed: f64,
    /// Mass gained per food particle consumed.
    #[serde(default = "default_mass_per_food")]
    pub mass_per_food: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_mass: default_player_start_mass(),
            speed: default_player_speed(),
            mass_per_food: default_mass_per_food(),
        }
    }
}

fn default_player_start_mass() -> f64 {
    100.0
}
fn default_player_speed() -> f64 {
    20.0
}
fn default_mass_per_food() -> f64 {
    10.0
}

/// Food configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    #[serde(default = "default_food_radius")]
    pub radius: f64,
    /// Number of particles seeded at startup. Eaten food does not come back.
    #[serde(default = "default_food_amount")]
    pub amount: usize,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            radius: default_food_radius(),
            amount: default_food_amount(),
        }
    }
}

fn default_food_radius() -> f64 {
    12.0
}
fn default_food_amount() -> usize {
    4000
}

/// Viewer camera configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    /// Width of the world area a camera shows.
    #[serde(default = "default_view_area_width")]
    pub view_area_width: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            view_area_width: default_view_area_width(),
        }
    }
}

fn default_view_area_width() -> f64 {
    2000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 5000

            [food]
            amount = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.tick_interval_ms, 40);
        assert_eq!(config.server.max_players, 200);
        assert_eq!(config.food.amount, 10);
        assert_eq!(config.food.radius, 12.0);
        assert_eq!(config.border.width, 10000.0);
        assert_eq!(config.player.start_mass, 100.0);
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.border.height, 8000.0);
        assert_eq!(parsed.player.mass_per_food, 10.0);
        assert_eq!(parsed.camera.view_area_width, 2000.0);
    }

    #[test]
    fn test_rejects_unusable_values() {
        assert!(Config::default().validate().is_ok());

        for text in [
            "[border]\nwidth = 0.0",
            "[border]\nheight = -10.0",
            "[server]\ntick_interval_ms = 0",
            "[player]\nspeed = 0.0",
            "[player]\nstart_mass = -1.0",
            "[food]\nradius = 0.0",
        ] {
            let config: Config = toml::from_str(text).unwrap();
            assert!(config.validate().is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn test_load_rejects_zero_border() {
        let dir = std::env::temp_dir().join(format!("blobfield-bad-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[border]\nwidth = 0.0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_writes_defaults() {
        let dir = std::env::temp_dir().join(format!("blobfield-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let _ = std::fs::remove_file(&path);

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 4000);

        let again = Config::load_from(&path).unwrap();
        assert_eq!(again.food.amount, config.food.amount);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
