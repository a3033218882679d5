use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Largest accepted `sector_pad`. The footprint holds about `pi * (pad + 1)^2`
/// sectors, all touched on every sector change.
pub const MAX_SECTOR_PAD: i32 = 256;

/// Errors from loading or validating a [`WorldConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Every tunable of the world model in one place.
///
/// Owned by the session and handed to the streamer and collision resolver at
/// construction. Missing JSON fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of sectors and chunks, in blocks.
    pub sector_size: i32,
    /// Terrain columns are clamped to this height.
    pub max_build_height: i32,
    /// Streaming radius around the observer, in chunks.
    pub render_radius: i32,
    /// Visibility radius around the observer, in sectors.
    pub sector_pad: i32,
    /// Unloading a chunk removes blocks with `y` below this.
    pub unload_height: i32,
    pub ticks_per_second: u32,
    /// Longest frame time simulated in one tick, in seconds.
    pub max_tick_dt: f32,
    pub substeps: u32,
    /// Horizontal distance the actor must travel before streaming re-runs.
    pub restream_distance: f32,
    /// Hit test distance, in blocks.
    pub reach: u32,
    /// Ray samples per block of hit test distance.
    pub hit_test_steps: u32,
    pub spawn: Vec3,
    pub physics: PhysicsConfig,
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            sector_size: 16,
            max_build_height: 319,
            render_radius: 3,
            sector_pad: 4,
            unload_height: 10,
            ticks_per_second: 60,
            max_tick_dt: 0.2,
            substeps: 8,
            restream_distance: 5.0,
            reach: 8,
            hit_test_steps: 8,
            spawn: Vec3::new(0.0, 10.0, 0.0),
            physics: PhysicsConfig::default(),
            terrain: TerrainConfig::default(),
        }
    }
}

/// Actor movement and collision parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    /// Peak height of a jump, in blocks.
    pub max_jump_height: f32,
    pub terminal_velocity: f32,
    pub walking_speed: f32,
    pub flying_speed: f32,
    /// Actor height in blocks while walking.
    pub actor_height: u32,
    /// Actor height in blocks while flying.
    pub flying_height: u32,
    /// Overlap tolerated before a face counts as a collision. At 0 any touch
    /// collides; at 0.5 or more the actor falls through the ground.
    pub collision_padding: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 20.0,
            max_jump_height: 1.2,
            terminal_velocity: 50.0,
            walking_speed: 5.0,
            flying_speed: 15.0,
            actor_height: 2,
            flying_height: 1,
            collision_padding: 0.25,
        }
    }
}

impl PhysicsConfig {
    /// Launch speed that peaks at `max_jump_height`: solve `v^2 = 2 g h`.
    pub fn jump_speed(&self) -> f32 {
        (2.0 * self.gravity * self.max_jump_height).sqrt()
    }
}

/// Noise parameters for the default height field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub seed: u32,
    pub octaves: usize,
    /// Noise cycles per block.
    pub frequency: f64,
    /// Column height where the noise is zero.
    pub base_height: f64,
    /// Height swing for noise at +/-1.
    pub amplitude: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 2,
            frequency: 0.02,
            base_height: 4.0,
            amplitude: 4.0,
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the world model cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if self.sector_size <= 0 {
            return invalid("sector_size", "must be positive");
        }
        if self.max_build_height < 1 {
            return invalid("max_build_height", "must be at least 1");
        }
        if self.render_radius < 0 {
            return invalid("render_radius", "must not be negative");
        }
        if self.sector_pad < 0 {
            return invalid("sector_pad", "must not be negative");
        }
        if self.sector_pad > MAX_SECTOR_PAD {
            return invalid("sector_pad", "exceeds MAX_SECTOR_PAD");
        }
        if self.unload_height < 0 {
            return invalid("unload_height", "must not be negative");
        }
        if self.ticks_per_second == 0 {
            return invalid("ticks_per_second", "must be positive");
        }
        if self.max_tick_dt.is_nan() || self.max_tick_dt <= 0.0 {
            return invalid("max_tick_dt", "must be positive");
        }
        if self.substeps == 0 {
            return invalid("substeps", "must be positive");
        }
        if self.hit_test_steps == 0 {
            return invalid("hit_test_steps", "must be positive");
        }
        if self.reach.checked_mul(self.hit_test_steps).is_none() {
            return invalid("reach", "reach * hit_test_steps overflows");
        }
        if self.physics.actor_height == 0 || self.physics.flying_height == 0 {
            return invalid("physics.actor_height", "must be at least one block");
        }
        if !(0.0..0.5).contains(&self.physics.collision_padding) {
            return invalid("physics.collision_padding", "must be in [0, 0.5)");
        }
        if self.terrain.octaves == 0 {
            return invalid("terrain.octaves", "must be positive");
        }
        Ok(())
    }

    /// Wall-clock budget for deferred visibility work in one tick.
    pub fn tick_budget(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.ticks_per_second as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn jump_speed_reaches_max_height() {
        let physics = PhysicsConfig::default();
        let v = physics.jump_speed();
        let peak = v * v / (2.0 * physics.gravity);
        assert!((peak - physics.max_jump_height).abs() < 1e-4);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            WorldConfig::from_json_str(r#"{ "render_radius": 5, "physics": { "gravity": 9.8 } }"#)
                .unwrap();
        assert_eq!(config.render_radius, 5);
        assert_eq!(config.physics.gravity, 9.8);
        assert_eq!(config.sector_size, 16);
        assert_eq!(config.physics.actor_height, 2);
    }

    #[test]
    fn invalid_sector_size_rejected() {
        let err = WorldConfig::from_json_str(r#"{ "sector_size": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "sector_size",
                ..
            }
        ));
    }

    #[test]
    fn padding_of_half_block_rejected() {
        let mut config = WorldConfig::default();
        config.physics.collision_padding = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_sector_pad_rejected() {
        let mut config = WorldConfig::default();
        config.sector_pad = MAX_SECTOR_PAD;
        assert!(config.validate().is_ok());
        config.sector_pad = 46_341;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "sector_pad",
                ..
            })
        ));
    }

    #[test]
    fn overflowing_ray_length_rejected() {
        let mut config = WorldConfig::default();
        config.reach = u32::MAX / 2;
        config.hit_test_steps = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "reach", .. })
        ));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let err = WorldConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn load_from_file_round_trips() {
        let mut config = WorldConfig::default();
        config.terrain.seed = 1234;
        config.reach = 5;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_json_pretty().unwrap().as_bytes())
            .unwrap();

        let loaded = WorldConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorldConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn tick_budget_matches_rate() {
        let config = WorldConfig::default();
        assert_eq!(config.tick_budget().as_micros(), 16_666);
    }
}
