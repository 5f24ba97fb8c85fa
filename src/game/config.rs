use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::game::math::GridLayout;

/// Path of the world configuration, relative to the working directory.
pub const WORLD_CONFIG_PATH: &str = "assets/world_config.ron";

/// Static world configuration loaded once at startup.
///
/// These values size every long-lived structure in the world (chunk pool, region
/// tables, search scratch). Changing them mid-game would invalidate resident chunks,
/// so they are read once and never hot-reloaded.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    // Terrain generation
    pub seed: u32,
    /// Replace `seed` with a random one at startup.
    pub randomize_seed: bool,
    pub noise_scale: f64,
    pub detail_scale: f64,
    pub water_level: f64,
    pub sand_margin: f64,
    pub rock_level: f64,
    pub tree_threshold: f64,

    // Chunk layout
    pub chunk_size: i32,
    pub divisions: i32,

    // Streaming
    /// View radius in chunks around the viewer.
    pub view_distance_chunks: i32,
    /// Cap on loads and on unloads proposed per loader scan.
    pub max_chunks_to_process: usize,
    /// How long shutdown waits for the loader thread before joining anyway.
    pub loader_shutdown_timeout_ms: u64,

    // Pathfinding budgets
    pub max_search_tiles: usize,
    pub max_region_search: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            randomize_seed: false,
            noise_scale: 0.045,
            detail_scale: 0.31,
            water_level: -0.35,
            sand_margin: 0.08,
            rock_level: 0.42,
            tree_threshold: 0.55,
            chunk_size: 32,
            divisions: 4,
            view_distance_chunks: 3,
            max_chunks_to_process: 8,
            loader_shutdown_timeout_ms: 500,
            max_search_tiles: 4096,
            max_region_search: 2048,
        }
    }
}

impl WorldConfig {
    /// Tile/chunk/region layout. Panics if the config was never validated and is unusable.
    pub fn layout(&self) -> GridLayout {
        GridLayout::new(self.chunk_size, self.divisions)
    }

    /// Squared view distance in tiles, compared against squared chunk-centre distances.
    pub fn view_distance_sqr(&self) -> f32 {
        let radius = (self.view_distance_chunks * self.chunk_size) as f32;
        radius * radius
    }

    /// Fixed cardinality of the chunk pool: every chunk coordinate in the scanned square.
    pub fn total_chunks(&self) -> usize {
        let side = (2 * self.view_distance_chunks + 1) as usize;
        side * side
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size <= 0 || self.divisions <= 0 {
            return Err(ConfigError::Invalid(format!(
                "chunk_size ({}) and divisions ({}) must be positive",
                self.chunk_size, self.divisions
            )));
        }
        if self.chunk_size % self.divisions != 0 {
            return Err(ConfigError::Invalid(format!(
                "chunk_size ({}) must be divisible by divisions ({})",
                self.chunk_size, self.divisions
            )));
        }
        if self.view_distance_chunks < 0 {
            return Err(ConfigError::Invalid("view_distance_chunks must not be negative".into()));
        }
        if self.max_chunks_to_process == 0 || self.max_search_tiles == 0 || self.max_region_search == 0 {
            return Err(ConfigError::Invalid("per-tick caps and search budgets must be non-zero".into()));
        }
        if self.noise_scale <= 0.0 {
            return Err(ConfigError::Invalid("noise_scale must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse world config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid world config: {0}")]
    Invalid(String),
}

/// Parse and validate a world config from RON text.
pub fn parse_world_config(contents: &str) -> Result<WorldConfig, ConfigError> {
    let config: WorldConfig = ron::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub fn load_world_config(path: impl AsRef<Path>) -> Result<WorldConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_world_config(&contents)
}

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        // A config inserted before the plugin (tests, tools) wins over the file.
        if app.world().contains_resource::<WorldConfig>() {
            return;
        }

        let mut config = match load_world_config(WORLD_CONFIG_PATH) {
            Ok(config) => {
                info!("Loaded world config from {}", WORLD_CONFIG_PATH);
                config
            }
            Err(e) => {
                error!("{}", e);
                error!("Using default WorldConfig");
                WorldConfig::default()
            }
        };
        if config.randomize_seed {
            config.seed = rand::random();
            info!("Randomized world seed: {}", config.seed);
        }
        app.insert_resource(config);
    }
}
