// src/analysis/summary.rs
//
// Cross-day aggregation of detections into one row per station, the
// input shape the downstream clustering workflow expects. Delay metrics
// need corridor flow data and are left to that external pipeline.

use crate::types::{Detection, StationSummary};
use chrono::{Duration, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// PeMS station data is sampled on a 5-minute grid; detections whose
/// timestamps are exactly one sample apart belong to the same episode.
const SAMPLE_MINUTES: i64 = 5;

pub fn summarize(detections: &[Detection]) -> Vec<StationSummary> {
    let mut by_station: HashMap<u32, Vec<&Detection>> = HashMap::new();
    for detection in detections {
        by_station.entry(detection.station_id).or_default().push(detection);
    }

    let mut summaries: Vec<StationSummary> = by_station
        .into_iter()
        .map(|(station_id, group)| summarize_station(station_id, &group))
        .collect();

    summaries.sort_by_key(|s| s.station_id);
    debug!("Summarized {} station(s)", summaries.len());
    summaries
}

fn summarize_station(station_id: u32, group: &[&Detection]) -> StationSummary {
    let days_active = group
        .iter()
        .map(|d| d.timestamp.date())
        .collect::<HashSet<_>>()
        .len();

    let detections = group.len();
    let avg_extent_miles = group.iter().map(|d| d.extent_miles).sum::<f64>() / detections as f64;
    let avg_speed_mph = group.iter().map(|d| d.speed_mph).sum::<f64>() / detections as f64;

    let episodes = episode_lengths(group);
    let avg_duration_min = episodes.iter().map(|&len| len as f64).sum::<f64>()
        / episodes.len() as f64
        * SAMPLE_MINUTES as f64;

    StationSummary {
        station_id,
        days_active,
        detections,
        avg_extent_miles,
        avg_duration_min,
        avg_speed_mph,
    }
}

/// Lengths (in samples) of the runs of consecutive 5-minute detections
fn episode_lengths(group: &[&Detection]) -> Vec<usize> {
    let mut timestamps: Vec<NaiveDateTime> = group.iter().map(|d| d.timestamp).collect();
    timestamps.sort();
    timestamps.dedup();

    let mut episodes = Vec::new();
    let mut current = 1usize;
    for pair in timestamps.windows(2) {
        if pair[1] - pair[0] == Duration::minutes(SAMPLE_MINUTES) {
            current += 1;
        } else {
            episodes.push(current);
            current = 1;
        }
    }
    episodes.push(current);
    episodes
}
