// src/analysis/finder.rs
//
// Bottleneck finder: drives the scanner across one day's reading table.
//
// Every reading slower than min_speed_mph seeds a scan, iterating seeds
// in original table order so the per-timestamp first-wins dedup below is
// deterministic. Only the FIRST candidate found for each timestamp
// survives — co-occurring bottlenecks at the same 5-minute period are
// collapsed to one, a behavior preserved as-is (see DESIGN.md).

use super::scanner::SlowdownScanner;
use crate::readings::ReadingTable;
use crate::types::{Candidate, Detection, DetectionConfig};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct FinderStats {
    pub rows_scanned: usize,
    pub seeds: usize,
    pub raw_candidates: usize,
    /// Co-occurring candidates dropped by the first-wins dedup
    pub dedup_dropped: usize,
    /// Candidates with no matching source row at join time
    pub unmatched_joins: usize,
}

pub struct BottleneckFinder {
    config: DetectionConfig,
    scanner: SlowdownScanner,
}

impl BottleneckFinder {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            scanner: SlowdownScanner::new(config.clone()),
            config,
        }
    }

    /// Run the full detection pass. Empty seed or candidate sets degrade
    /// to an empty result, never an error.
    pub fn detect(&self, table: &ReadingTable) -> (Vec<Detection>, FinderStats) {
        let mut stats = FinderStats {
            rows_scanned: table.len(),
            ..FinderStats::default()
        };

        let mut candidates: Vec<Candidate> = Vec::new();
        for (index, row) in table.rows().iter().enumerate() {
            if row.speed_mph >= self.config.min_speed_mph {
                continue;
            }
            stats.seeds += 1;

            let found = self.scanner.scan(table, index);
            if !found.is_empty() {
                debug!(
                    "Seed station {} ({:.1} mph) at {}: {} candidate(s)",
                    row.station_id,
                    row.speed_mph,
                    row.timestamp,
                    found.len()
                );
            }
            candidates.extend(found);
        }
        stats.raw_candidates = candidates.len();

        // First candidate per timestamp wins, in discovery order
        let mut seen: HashSet<NaiveDateTime> = HashSet::new();
        let mut kept: Vec<Candidate> = Vec::new();
        for candidate in candidates {
            if seen.insert(candidate.timestamp) {
                kept.push(candidate);
            } else {
                stats.dedup_dropped += 1;
            }
        }

        // Re-attach postmile and speed from the source rows
        let mut detections = Vec::new();
        for candidate in &kept {
            match table.lookup(candidate.station_id, candidate.timestamp) {
                Some(index) => {
                    let row = table.reading(index);
                    detections.push(Detection {
                        timestamp: row.timestamp,
                        station_id: row.station_id,
                        abs_postmile: row.abs_postmile,
                        speed_mph: row.speed_mph,
                        extent_miles: candidate.extent_miles,
                    });
                }
                None => stats.unmatched_joins += 1,
            }
        }

        if stats.unmatched_joins > 0 {
            warn!(
                "⚠️  {} candidate(s) had no source row at join time",
                stats.unmatched_joins
            );
        }

        (detections, stats)
    }
}
