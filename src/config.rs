//! Tolerances and defaults used by the geometry operations.
//!
//! Settings can be loaded from a TOML file; every field is optional and falls back to the
//! defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_FLATNESS: f64 = 0.1;
pub const DEFAULT_HIT_EPSILON: f64 = 0.1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum chord-to-curve deviation for length and position queries.
    pub flatness: f64,
    /// Default hit tolerance.
    pub hit_epsilon: f64,
    pub fit: FitOptions,
    pub flatten: FlattenOptions,
}

/// Parameters of `points_to_curves`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Maximum distance between the fitted curves and the input points, in scaled units.
    pub tolerance: f64,
    /// Turning angle in radians above which an anchor is kept as a corner.
    pub threshold: f64,
    /// Number of neighbouring points on each side used to estimate the turning angle.
    pub corner_radius: u32,
    pub scale: f64,
}

/// Parameters of `curves_to_points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    pub max_point_distance: f64,
    pub flatness: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            flatness: DEFAULT_FLATNESS,
            hit_epsilon: DEFAULT_HIT_EPSILON,
            fit: FitOptions::default(),
            flatten: FlattenOptions::default(),
        }
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            tolerance: 2.5,
            threshold: 1.0,
            corner_radius: 1,
            scale: 1.0,
        }
    }
}

impl FitOptions {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            max_point_distance: 1000.0,
            flatness: DEFAULT_FLATNESS,
        }
    }
}

impl FlattenOptions {
    pub fn with_max_point_distance(max_point_distance: f64) -> Self {
        Self {
            max_point_distance,
            ..Self::default()
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Loads `artpath.toml` from the working directory, or the defaults if that fails.
    pub fn load_or_default() -> Self {
        match Self::load_from_file("artpath.toml") {
            Ok(settings) => settings,
            Err(err) => {
                log::debug!("using default settings: {}", err);
                Self::default()
            }
        }
    }
}
