use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub detection: DetectionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub input_dir: String,
    pub output_dir: String,
    /// Also append detections as JSONL alongside the per-day CSVs
    #[serde(default)]
    pub write_jsonl: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Readings slower than this are bottleneck seeds
    pub min_speed_mph: f64,
    /// Hard limit on how far from the seed the scan walks (miles).
    /// The walk STOPS at the first row beyond this, it does not skip.
    pub max_distance_miles: f64,
    /// A candidate must be faster than the seed by more than this (mph)
    pub mph_trigger: f64,
    /// Which way along the corridor the scan walks from the seed
    pub direction: ScanDirection,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_speed_mph: 40.0,
            max_distance_miles: 3.0,
            mph_trigger: 20.0,
            direction: ScanDirection::Increasing,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanDirection {
    /// Walk toward increasing absolute postmile
    Increasing,
    /// Walk toward decreasing absolute postmile
    Decreasing,
}

impl ScanDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
        }
    }
}

/// One 5-minute station reading. Immutable once loaded; at a fixed
/// timestamp the postmiles of a corridor's readings are strictly ordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub station_id: u32,
    pub abs_postmile: f64,
    pub speed_mph: f64,
}

/// A (station, timestamp) pair flagged by the scanner. Transient: the
/// finder joins candidates back to the source rows and discards them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub station_id: u32,
    pub timestamp: NaiveDateTime,
    /// Postmile distance from the seed that produced this candidate
    pub extent_miles: f64,
}

/// A source row flagged as a bottleneck detection, plus the seed extent.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Detection {
    pub timestamp: NaiveDateTime,
    pub station_id: u32,
    pub abs_postmile: f64,
    pub speed_mph: f64,
    pub extent_miles: f64,
}

/// Cross-day aggregate for one station, for downstream clustering.
#[derive(Debug, Clone, Serialize)]
pub struct StationSummary {
    pub station_id: u32,
    pub days_active: usize,
    pub detections: usize,
    pub avg_extent_miles: f64,
    pub avg_duration_min: f64,
    pub avg_speed_mph: f64,
}
