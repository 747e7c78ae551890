//! Scene Configuration
//!
//! Island layout, waypoints and generation parameters, loaded from TOML.
//! `Default` is the wedding scene: RSVP, food, accommodation and venue islands.

use std::path::Path;
use std::time::Duration;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use super::island::{IslandBuilder, IslandShape};
use super::navigation::DEFAULT_TRAVEL_DURATION;
use super::noise_map::NoiseMap;
use super::picking::IslandPicker;
use super::waypoint::{Waypoint, WaypointTable, anchors_match};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("islands '{first}' and '{second}' have anchors too close to tell apart")]
    DuplicateAnchor { first: String, second: String },
}

/// One navigable island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandConfig {
    pub name: String,
    /// Rest position of the island center (click target)
    pub anchor: Vec3,
    /// Camera eye on arrival
    pub camera_position: Vec3,
    /// Camera look-at on arrival
    pub look_at: Vec3,
    /// Top surface color (linear RGB)
    pub color: [f32; 3],
    /// Bounding-sphere radius used for click picking
    #[serde(default = "default_pick_radius")]
    pub pick_radius: f32,
}

fn default_pick_radius() -> f32 {
    7.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Peak per-axis vertex jitter for island meshes (world units)
    pub jitter_magnitude: f32,
    /// Camera flight time between islands (milliseconds)
    pub travel_duration_ms: u64,
    /// Bobbing amplitude of the islands (world units)
    pub float_amplitude: f32,
    /// Seed for mesh jitter, so the scene looks the same every launch
    pub seed: u64,
    /// Camera eye before any island is selected
    pub overview_eye: Vec3,
    /// Camera look-at before any island is selected
    pub overview_target: Vec3,
    pub island: IslandShape,
    pub noise: NoiseMap,
    pub islands: Vec<IslandConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let island = |name: &str, anchor: Vec3, color: [f32; 3]| IslandConfig {
            name: name.to_string(),
            anchor,
            camera_position: anchor + Vec3::new(0.0, 14.0, 22.0),
            look_at: anchor + Vec3::new(0.0, 1.0, 0.0),
            color,
            pick_radius: default_pick_radius(),
        };
        Self {
            jitter_magnitude: 0.12,
            travel_duration_ms: DEFAULT_TRAVEL_DURATION.as_millis() as u64,
            float_amplitude: 0.4,
            seed: 2024,
            overview_eye: Vec3::new(0.0, 55.0, 80.0),
            overview_target: Vec3::ZERO,
            island: IslandShape::default(),
            noise: NoiseMap::default(),
            islands: vec![
                island("rsvp", Vec3::new(-24.0, 0.0, 0.0), [0.45, 0.72, 0.38]),
                island("food", Vec3::new(0.0, 3.0, -22.0), [0.55, 0.75, 0.30]),
                island("accommodation", Vec3::new(24.0, -1.0, 0.0), [0.38, 0.66, 0.42]),
                island("venue", Vec3::new(0.0, 2.0, 22.0), [0.62, 0.78, 0.40]),
            ],
        }
    }
}

impl SceneConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        log::info!("loaded scene config from {} ({} islands)", path.display(), config.islands.len());
        Ok(config)
    }

    /// Anchors must be far enough apart that a clicked anchor resolves to one island.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, a) in self.islands.iter().enumerate() {
            for b in &self.islands[i + 1..] {
                if anchors_match(a.anchor, b.anchor) {
                    return Err(ConfigError::DuplicateAnchor {
                        first: a.name.clone(),
                        second: b.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn travel_duration(&self) -> Duration {
        Duration::from_millis(self.travel_duration_ms)
    }

    /// Waypoints in island order, so island index == waypoint index.
    pub fn waypoint_table(&self) -> WaypointTable {
        self.islands
            .iter()
            .map(|i| Waypoint {
                name: i.name.clone(),
                anchor: i.anchor,
                camera_position: i.camera_position,
                look_at: i.look_at,
            })
            .collect()
    }

    pub fn picker(&self) -> IslandPicker {
        let mut picker = IslandPicker::new();
        for island in &self.islands {
            picker.add(island.anchor, island.pick_radius);
        }
        picker
    }

    pub fn island_builder(&self) -> IslandBuilder {
        IslandBuilder {
            shape: self.island,
            noise: self.noise,
            jitter_magnitude: self.jitter_magnitude,
        }
    }
}
