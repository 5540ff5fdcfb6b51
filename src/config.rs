//! World configuration.
//!
//! Mirrors the configuration options enumerated in the spec's external
//! interfaces section. Loadable from TOML via `toml`, with `Default`
//! matching the stated defaults.

use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};

/// Radii for the three outer LOD tiers, each strictly greater than the last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LodRadii {
    pub l1: i32,
    pub l2: i32,
    pub l3: i32,
}

impl Default for LodRadii {
    fn default() -> Self {
        LodRadii {
            l1: 12,
            l2: 20,
            l3: 32,
        }
    }
}

/// Which worldgen strategy to bind at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorKind {
    Overworld,
    Flat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub seed: u64,
    pub render_distance: i32,
    pub lod_radii: LodRadii,
    pub sea_level: i32,
    pub ocean_threshold: f32,
    pub temp_lapse: f32,
    pub ridge_inland_min: f32,
    pub ridge_inland_max: f32,
    pub ridge_inland_sparsity: f32,
    pub max_uploads_per_frame: u32,
    pub generator: GeneratorKind,
    /// `None` lets rayon pick its default (`num_cpus::get()`).
    pub worker_threads: Option<usize>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: 0,
            render_distance: 8,
            lod_radii: LodRadii::default(),
            sea_level: 64,
            ocean_threshold: 0.35,
            temp_lapse: 0.25,
            ridge_inland_min: 0.45,
            ridge_inland_max: 0.9,
            ridge_inland_sparsity: 0.6,
            max_uploads_per_frame: 4,
            generator: GeneratorKind::Overworld,
            worker_threads: None,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a configuration from TOML source text.
    pub fn from_toml(source: &str) -> WorldResult<Self> {
        let config: WorldConfig =
            toml::from_str(source).map_err(|e| WorldError::InvalidConfig {
                field: "<root>".to_string(),
                value: String::new(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WorldResult<()> {
        if self.render_distance < 1 {
            return Err(WorldError::InvalidConfig {
                field: "render_distance".to_string(),
                value: self.render_distance.to_string(),
                reason: "must be >= 1".to_string(),
            });
        }
        if !(self.lod_radii.l1 > self.render_distance
            && self.lod_radii.l2 > self.lod_radii.l1
            && self.lod_radii.l3 > self.lod_radii.l2)
        {
            return Err(WorldError::InvalidConfig {
                field: "lod_radii".to_string(),
                value: format!("{:?}", self.lod_radii),
                reason: "each radius must strictly exceed the previous tier".to_string(),
            });
        }
        if self.max_uploads_per_frame == 0 {
            return Err(WorldError::InvalidConfig {
                field: "max_uploads_per_frame".to_string(),
                value: "0".to_string(),
                reason: "must allow at least one upload per frame".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_increasing_radii() {
        let mut config = WorldConfig::default();
        config.lod_radii.l2 = config.lod_radii.l1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = WorldConfig::default();
        let text = toml::to_string(&config).expect("serialize");
        let parsed = WorldConfig::from_toml(&text).expect("parse");
        assert_eq!(parsed.seed, config.seed);
        assert_eq!(parsed.lod_radii, config.lod_radii);
    }
}
