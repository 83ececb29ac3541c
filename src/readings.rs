// src/readings.rs
//
// CSV ingest for PeMS 5-minute station extracts, one file per day, and
// the indexed in-memory table the detection pass scans over.

use crate::types::Reading;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Raw CSV row as exported from the PeMS clearinghouse. Speed is empty
/// for detector holes, so it deserializes as optional.
#[derive(Debug, Deserialize)]
struct RawReading {
    timestamp: String,
    station: u32,
    #[serde(rename = "abs_PM", alias = "abs_pm")]
    abs_pm: f64,
    speed: Option<f64>,
}

/// PeMS export format first, ISO-8601 as fallback
const TIMESTAMP_FORMATS: [&str; 2] = ["%m/%d/%Y %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Find the daily extract files under the input directory, in sorted path
/// order so multi-day summaries are reproducible run to run.
pub fn find_daily_files(input_dir: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext.eq_ignore_ascii_case("csv") {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    info!("Found {} daily extract file(s)", files.len());
    Ok(files)
}

pub fn load_readings(path: &Path) -> Result<Vec<Reading>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening readings file {}", path.display()))?;
    let readings = parse_readings(file)
        .with_context(|| format!("parsing readings file {}", path.display()))?;
    info!(
        "Loaded {} reading(s) from {}",
        readings.len(),
        path.display()
    );
    Ok(readings)
}

fn parse_readings<R: Read>(input: R) -> Result<Vec<Reading>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut readings = Vec::new();
    let mut skipped = 0usize;

    for result in reader.deserialize() {
        let raw: RawReading = result?;

        let speed_mph = match raw.speed {
            Some(s) => s,
            None => {
                skipped += 1;
                continue;
            }
        };
        let timestamp = match parse_timestamp(&raw.timestamp) {
            Some(ts) => ts,
            None => {
                skipped += 1;
                continue;
            }
        };

        readings.push(Reading {
            timestamp,
            station_id: raw.station,
            abs_postmile: raw.abs_pm,
            speed_mph,
        });
    }

    if skipped > 0 {
        warn!(
            "⚠️  Skipped {} row(s) with missing speed or unparsable timestamp",
            skipped
        );
    }

    Ok(readings)
}

/// The reading table for one day/corridor, with the two indexes the
/// detection pass needs: per-timestamp row positions sorted by postmile,
/// and a (station, timestamp) map for joining candidates back to rows.
pub struct ReadingTable {
    rows: Vec<Reading>,
    by_timestamp: HashMap<NaiveDateTime, Vec<usize>>,
    by_station_time: HashMap<(u32, NaiveDateTime), usize>,
}

impl ReadingTable {
    pub fn from_rows(rows: Vec<Reading>) -> Self {
        let mut by_timestamp: HashMap<NaiveDateTime, Vec<usize>> = HashMap::new();
        let mut by_station_time: HashMap<(u32, NaiveDateTime), usize> = HashMap::new();
        let mut duplicates = 0usize;

        for (i, row) in rows.iter().enumerate() {
            by_timestamp.entry(row.timestamp).or_default().push(i);

            // Keep the first occurrence when a station reports twice at
            // the same timestamp
            match by_station_time.entry((row.station_id, row.timestamp)) {
                Entry::Occupied(_) => duplicates += 1,
                Entry::Vacant(vacant) => {
                    vacant.insert(i);
                }
            }
        }

        // Postmiles at a fixed timestamp are assumed unique, which makes
        // this a strict ordering of the corridor positions
        for indices in by_timestamp.values_mut() {
            indices.sort_by(|&a, &b| {
                rows[a]
                    .abs_postmile
                    .partial_cmp(&rows[b].abs_postmile)
                    .unwrap_or(Ordering::Equal)
            });
        }

        if duplicates > 0 {
            warn!(
                "⚠️  {} duplicate (station, timestamp) row(s), keeping first occurrence",
                duplicates
            );
        }

        Self {
            rows,
            by_timestamp,
            by_station_time,
        }
    }

    pub fn rows(&self) -> &[Reading] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn reading(&self, index: usize) -> &Reading {
        &self.rows[index]
    }

    /// Row indices at this timestamp, sorted by absolute postmile.
    /// Empty slice when the timestamp is absent.
    pub fn rows_at(&self, timestamp: NaiveDateTime) -> &[usize] {
        self.by_timestamp
            .get(&timestamp)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn lookup(&self, station_id: u32, timestamp: NaiveDateTime) -> Option<usize> {
        self.by_station_time
            .get(&(station_id, timestamp))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn test_parse_pems_and_iso_timestamps() {
        assert_eq!(
            parse_timestamp("01/15/2017 08:05:00"),
            parse_timestamp("2017-01-15T08:05:00")
        );
        assert!(parse_timestamp("not a timestamp").is_none());
    }

    #[test]
    fn test_parse_readings_skips_holes() {
        let csv = "\
timestamp,station,abs_PM,speed
01/15/2017 08:05:00,401001,12.5,62.3
01/15/2017 08:05:00,401002,13.1,
bad-timestamp,401003,13.9,58.0
01/15/2017 08:05:00,401004,14.2,55.5
";
        let readings = parse_readings(csv.as_bytes()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].station_id, 401001);
        assert_eq!(readings[1].abs_postmile, 14.2);
    }

    #[test]
    fn test_rows_at_sorted_by_postmile() {
        let t = ts("01/15/2017 08:05:00");
        let rows = vec![
            Reading {
                timestamp: t,
                station_id: 3,
                abs_postmile: 14.2,
                speed_mph: 60.0,
            },
            Reading {
                timestamp: t,
                station_id: 1,
                abs_postmile: 12.5,
                speed_mph: 62.0,
            },
            Reading {
                timestamp: t,
                station_id: 2,
                abs_postmile: 13.1,
                speed_mph: 61.0,
            },
        ];
        let table = ReadingTable::from_rows(rows);

        let stations: Vec<u32> = table
            .rows_at(t)
            .iter()
            .map(|&i| table.reading(i).station_id)
            .collect();
        assert_eq!(stations, vec![1, 2, 3]);
    }

    #[test]
    fn test_lookup_keeps_first_duplicate() {
        let t = ts("01/15/2017 08:05:00");
        let rows = vec![
            Reading {
                timestamp: t,
                station_id: 1,
                abs_postmile: 12.5,
                speed_mph: 62.0,
            },
            Reading {
                timestamp: t,
                station_id: 1,
                abs_postmile: 12.5,
                speed_mph: 30.0,
            },
        ];
        let table = ReadingTable::from_rows(rows);

        let idx = table.lookup(1, t).unwrap();
        assert_eq!(table.reading(idx).speed_mph, 62.0);
    }

    #[test]
    fn test_missing_timestamp_is_empty_slice() {
        let table = ReadingTable::from_rows(Vec::new());
        assert!(table.rows_at(ts("01/15/2017 08:05:00")).is_empty());
        assert!(table.lookup(1, ts("01/15/2017 08:05:00")).is_none());
    }
}
