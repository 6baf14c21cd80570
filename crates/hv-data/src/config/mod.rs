//! Engine configuration
//!
//! Every field has a default matching the stock dashboard, so an empty JSON
//! object (or no file at all) yields a working configuration.

use std::path::Path;

use hv_core::Liveness;
use serde::{Deserialize, Serialize};

use crate::geo::{GeoGenerator, LatLng};
use crate::DataError;

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub map: MapConfig,
    pub graph: GraphStyle,
    pub csv: CsvConfig,
}

/// Where synthetic host coordinates are scattered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center: LatLng,
    /// Radius of the scatter disk in meters
    pub radius_meters: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(39.446376, -101.777344),
            radius_meters: 100_000.0,
        }
    }
}

impl MapConfig {
    pub fn generator(&self) -> GeoGenerator {
        GeoGenerator::new(self.center, self.radius_meters)
    }
}

/// Labels and colors for the network graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStyle {
    pub root_label: String,
    pub root_color: String,
    pub up_color: String,
    pub down_color: String,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            root_label: "Switch".to_string(),
            root_color: "#d5d53e".to_string(),
            up_color: "#4ed8a0".to_string(),
            down_color: "#dc4e58".to_string(),
        }
    }
}

impl GraphStyle {
    pub fn color_for(&self, liveness: Liveness) -> &str {
        match liveness {
            Liveness::Up => &self.up_color,
            Liveness::Down => &self.down_color,
        }
    }
}

/// Zone timestamps are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvTimeZone {
    Utc,
    /// The zone of the machine running the export
    #[default]
    Local,
    FixedOffsetMinutes(i32),
}

/// How cell values are delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvQuoting {
    /// Plain comma join; values containing commas or quotes are not escaped
    #[default]
    Never,
    /// RFC 4180 quoting for values that need it
    Necessary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub time_zone: CsvTimeZone,
    pub quoting: CsvQuoting,
}

impl CsvConfig {
    /// UTC timestamps, unquoted values
    pub fn utc() -> Self {
        Self {
            time_zone: CsvTimeZone::Utc,
            quoting: CsvQuoting::Never,
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;

        tracing::info!(path = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    /// Check value ranges serde cannot express
    pub fn validate(&self) -> Result<(), DataError> {
        let MapConfig { center, radius_meters } = &self.map;

        if !radius_meters.is_finite() || *radius_meters < 0.0 {
            return Err(DataError::InvalidConfig(format!(
                "map.radius_meters must be a non-negative number, got {radius_meters}"
            )));
        }

        if !(-90.0..=90.0).contains(&center.lat) {
            return Err(DataError::InvalidConfig(format!(
                "map.center.lat must be within [-90, 90], got {}",
                center.lat
            )));
        }

        if !(-180.0..=180.0).contains(&center.lng) {
            return Err(DataError::InvalidConfig(format!(
                "map.center.lng must be within [-180, 180], got {}",
                center.lng
            )));
        }

        if let CsvTimeZone::FixedOffsetMinutes(minutes) = self.csv.time_zone {
            if minutes.abs() >= 24 * 60 {
                return Err(DataError::InvalidConfig(format!(
                    "csv.time_zone offset must be under 24h, got {minutes} minutes"
                )));
            }
        }

        Ok(())
    }
}
