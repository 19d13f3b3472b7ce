//! Skirmish configuration
//!
//! A skirmish is described by a RON (Rusty Object Notation) or JSON file:
//! simulation settings, an optional walkability grid, and the units to spawn.
//!
//! # Example RON
//!
//! ```ron
//! SkirmishConfig(
//!     name: "Duel",
//!     fixed_dt: 0.05,
//!     frames: 1200,
//!     units: [
//!         UnitSpawn(name: "Red", team: 0, position: (0.0, 0.0, 0.0), attack: Some(1)),
//!         UnitSpawn(name: "Blue", team: 1, position: (30.0, 0.0, 0.0)),
//!     ],
//! )
//! ```

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::ai::Grid;
use crate::combat::UnitStats;

/// Walkability grid description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Width in cells (along X)
    pub width: usize,
    /// Depth in cells (along Z)
    pub depth: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// World (x, z) position of the grid corner
    #[serde(default)]
    pub origin: Vec2,
    /// Blocked cells
    #[serde(default)]
    pub blocked: Vec<(usize, usize)>,
}

impl GridConfig {
    /// Build the grid
    #[must_use]
    pub fn build(&self) -> Grid {
        let mut grid = Grid::new(self.width, self.depth, self.cell_size).with_origin(self.origin);
        for &cell in &self.blocked {
            grid.set_walkable(cell, false);
        }
        grid
    }
}

/// A unit to place at the start of the skirmish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpawn {
    /// Display name
    pub name: String,
    /// Team index
    pub team: u8,
    /// Starting position
    pub position: Vec3,
    /// Combat statistics
    #[serde(default)]
    pub stats: UnitStats,
    /// Index of another spawn to attack immediately
    #[serde(default)]
    pub attack: Option<usize>,
}

impl UnitSpawn {
    /// Create a spawn with default stats
    #[must_use]
    pub fn new(name: impl Into<String>, team: u8, position: Vec3) -> Self {
        Self {
            name: name.into(),
            team,
            position,
            stats: UnitStats::default(),
            attack: None,
        }
    }

    /// Use the given stats
    #[must_use]
    pub fn with_stats(mut self, stats: UnitStats) -> Self {
        self.stats = stats;
        self
    }

    /// Attack the spawn at `index` on start
    #[must_use]
    pub fn attacking(mut self, index: usize) -> Self {
        self.attack = Some(index);
        self
    }
}

/// A complete skirmish description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirmishConfig {
    /// Skirmish name
    pub name: String,
    /// Seconds per simulation step
    pub fixed_dt: f32,
    /// Maximum number of steps to run
    pub frames: u64,
    /// Whether idle units engage enemies in sight on their own
    pub auto_acquire: bool,
    /// Optional walkability grid; straight-line movement without one
    pub grid: Option<GridConfig>,
    /// Units to spawn, in order
    pub units: Vec<UnitSpawn>,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            name: String::from("Duel"),
            fixed_dt: 1.0 / 30.0,
            frames: 1800,
            auto_acquire: true,
            grid: None,
            units: vec![
                UnitSpawn::new("Red", 0, Vec3::ZERO)
                    .with_stats(UnitStats::default().with_attack(6.0, 1.0))
                    .attacking(1),
                UnitSpawn::new("Blue", 1, Vec3::new(20.0, 0.0, 0.0)),
            ],
        }
    }
}

impl SkirmishConfig {
    /// Check the configuration describes a runnable skirmish
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive time step, invalid unit stats, or
    /// an attack order naming a missing spawn or the unit itself
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "fixed_dt must be positive, got {}",
                self.fixed_dt
            )));
        }

        for (index, unit) in self.units.iter().enumerate() {
            unit.stats
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("unit {index} ({}): {e}", unit.name)))?;

            if let Some(target) = unit.attack {
                if target >= self.units.len() || target == index {
                    return Err(ConfigError::Invalid(format!(
                        "unit {index} ({}) cannot attack spawn {target}",
                        unit.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse and validate a configuration from RON text
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: SkirmishConfig =
            ron::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: SkirmishConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration, choosing the format from the file extension
    /// (`.json` for JSON, anything else for RON)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }
}

/// Errors that can occur while loading or saving a configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// Parsed but not runnable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SkirmishConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_ron() {
        let config = SkirmishConfig::from_ron_str(
            r#"(
                name: "Bridge",
                fixed_dt: 0.05,
                grid: Some((width: 20, depth: 10, cell_size: 2.0, blocked: [(5, 5)])),
                units: [
                    (name: "Archer", team: 0, position: (1.0, 0.0, 1.0),
                     stats: (attack_range: 12.0, attack_rate: 1.5), attack: Some(1)),
                    (name: "Knight", team: 1, position: (30.0, 0.0, 1.0)),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(config.name, "Bridge");
        assert_eq!(config.frames, SkirmishConfig::default().frames);
        assert_eq!(config.units.len(), 2);
        assert_eq!(config.units[0].stats.attack_range, 12.0);
        assert_eq!(config.units[1].position, Vec3::new(30.0, 0.0, 1.0));

        let grid = config.grid.as_ref().unwrap().build();
        assert!(!grid.is_walkable((5, 5)));
        assert!(grid.is_walkable((4, 5)));
    }

    #[test]
    fn test_bundled_demo_parses() {
        let config = SkirmishConfig::from_ron_str(include_str!("../../demos/duel.ron")).unwrap();

        assert_eq!(config.units.len(), 3);
        assert_eq!(config.units[0].attack, Some(2));
        assert_eq!(config.units[1].stats, UnitStats::default());

        let grid = config.grid.as_ref().unwrap().build();
        assert!(!grid.is_walkable((15, 0)));
        assert!(grid.is_walkable((15, 10)));
        assert!(grid.cell_at(config.units[2].position).is_some());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SkirmishConfig::default();

        let json = serde_json::to_string(&config).unwrap();
        let loaded: SkirmishConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_rejects_self_attack() {
        let mut config = SkirmishConfig::default();
        config.units[1].attack = Some(1);

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_invalid_stats() {
        let config = SkirmishConfig::from_ron_str(
            r#"(units: [(name: "Broken", team: 0, position: (0.0, 0.0, 0.0),
                         stats: (attack_rate: -1.0))])"#,
        );

        let err = config.unwrap_err();
        assert!(err.to_string().contains("attack_rate"));
    }

    #[test]
    fn test_rejects_bad_time_step() {
        let config = SkirmishConfig {
            fixed_dt: 0.0,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }
}
