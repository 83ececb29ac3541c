// src/analysis/scanner.rs
//
// Bottleneck candidate scanner.
//
// Given a "seed" reading whose speed has collapsed, walk outward over the
// postmile-ordered stations at the seed's timestamp and flag neighbors
// whose speed recovers sharply. A flagged neighbor marks the downstream
// (or upstream, depending on scan direction) edge of a slowdown.
//
// The walk is a single monotonic pass:
//   - it STOPS at the first row farther than max_distance_miles from the
//     seed; rows beyond that point are never examined;
//   - rows failing the speed conditions are skipped without ending the
//     walk.
//
// The rise condition compares each row against the immediately preceding
// row of the walk, NOT against the seed, so a sequence can qualify even
// when it is not monotonic overall. That comparison is kept as-is
// (see DESIGN.md).

use crate::readings::ReadingTable;
use crate::types::{Candidate, DetectionConfig, ScanDirection};
use std::collections::HashSet;
use tracing::debug;

pub struct SlowdownScanner {
    config: DetectionConfig,
}

impl SlowdownScanner {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Scan outward from the reading at `seed_index`, returning qualifying
    /// candidates in walk order. Empty when the seed has no neighbors in
    /// the scan direction or nothing qualifies.
    pub fn scan(&self, table: &ReadingTable, seed_index: usize) -> Vec<Candidate> {
        let seed = *table.reading(seed_index);
        let neighbors = table.rows_at(seed.timestamp);

        let seed_pos = match neighbors.iter().position(|&i| i == seed_index) {
            Some(pos) => pos,
            None => return Vec::new(),
        };

        let outward: Vec<usize> = match self.config.direction {
            ScanDirection::Increasing => ((seed_pos + 1)..neighbors.len()).collect(),
            ScanDirection::Decreasing => (0..seed_pos).rev().collect(),
        };

        let mut candidates = Vec::new();
        let mut seen: HashSet<u32> = HashSet::new();
        // On the first step the immediately-closer row is the seed itself
        let mut closer_speed = seed.speed_mph;

        for pos in outward {
            let row = table.reading(neighbors[pos]);
            let distance = (row.abs_postmile - seed.abs_postmile).abs();

            if distance > self.config.max_distance_miles {
                debug!(
                    "Station {} at {:.2} mi exceeds {:.2} mi window, stopping walk",
                    row.station_id, distance, self.config.max_distance_miles
                );
                break;
            }

            let rises_over_neighbor = row.speed_mph - closer_speed > 0.0;
            let clears_trigger = row.speed_mph - seed.speed_mph > self.config.mph_trigger;

            if rises_over_neighbor && clears_trigger && seen.insert(row.station_id) {
                debug!(
                    "Candidate: station {} ({:.1} mph) vs seed {} ({:.1} mph), extent {:.2} mi",
                    row.station_id, row.speed_mph, seed.station_id, seed.speed_mph, distance
                );
                candidates.push(Candidate {
                    station_id: row.station_id,
                    timestamp: seed.timestamp,
                    extent_miles: distance,
                });
            }

            closer_speed = row.speed_mph;
        }

        candidates
    }
}
