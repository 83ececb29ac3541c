// src/report.rs
//
// Output tables: a detections CSV per input day, one station summary CSV
// per run, and optionally a JSONL stream of detection events.

use crate::types::{Detection, StationSummary};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ReportWriter {
    output_dir: PathBuf,
    write_jsonl: bool,
}

impl ReportWriter {
    pub fn new(output_dir: &str, write_jsonl: bool) -> Result<Self> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("creating output directory {}", output_dir))?;
        Ok(Self {
            output_dir: PathBuf::from(output_dir),
            write_jsonl,
        })
    }

    pub fn write_detections(&self, day_stem: &str, detections: &[Detection]) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}_bottlenecks.csv", day_stem));
        write_csv(&path, detections)?;

        if self.write_jsonl {
            let jsonl_path = self.output_dir.join(format!("{}_bottlenecks.jsonl", day_stem));
            let mut file = fs::File::create(&jsonl_path)?;
            for detection in detections {
                let json_line = serde_json::to_string(detection)?;
                writeln!(file, "{}", json_line)?;
            }
            file.flush()?;
        }

        info!(
            "💾 {} detection(s) written to {}",
            detections.len(),
            path.display()
        );
        Ok(path)
    }

    pub fn write_summary(&self, summaries: &[StationSummary]) -> Result<PathBuf> {
        let path = self.output_dir.join("station_summary.csv");
        write_csv(&path, summaries)?;
        info!(
            "💾 Summary for {} station(s) written to {}",
            summaries.len(),
            path.display()
        );
        Ok(path)
    }
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn detection() -> Detection {
        Detection {
            timestamp: NaiveDateTime::parse_from_str("2017-01-15T08:05:00", "%Y-%m-%dT%H:%M:%S")
                .unwrap(),
            station_id: 401001,
            abs_postmile: 12.5,
            speed_mph: 55.0,
            extent_miles: 1.0,
        }
    }

    fn temp_output_dir(tag: &str) -> String {
        let dir = std::env::temp_dir().join(format!(
            "bottleneck_report_{}_{}",
            tag,
            std::process::id()
        ));
        dir.to_str().unwrap().to_string()
    }

    #[test]
    fn test_detections_csv_has_header_and_rows() {
        let out = temp_output_dir("detections");
        let writer = ReportWriter::new(&out, false).unwrap();

        let path = writer.write_detections("d01_2017_01_15", &[detection()]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("station_id"));
        assert!(lines[1].contains("401001"));

        fs::remove_dir_all(&out).ok();
    }

    #[test]
    fn test_jsonl_written_when_enabled() {
        let out = temp_output_dir("jsonl");
        let writer = ReportWriter::new(&out, true).unwrap();

        writer.write_detections("d01", &[detection(), detection()]).unwrap();

        let jsonl = fs::read_to_string(Path::new(&out).join("d01_bottlenecks.jsonl")).unwrap();
        assert_eq!(jsonl.lines().count(), 2);
        let parsed: serde_json::Value = serde_json::from_str(jsonl.lines().next().unwrap()).unwrap();
        assert_eq!(parsed["station_id"], 401001);

        fs::remove_dir_all(&out).ok();
    }

    #[test]
    fn test_empty_detections_write_header_only() {
        let out = temp_output_dir("empty");
        let writer = ReportWriter::new(&out, false).unwrap();

        let path = writer.write_detections("d02", &[]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.trim().is_empty() || contents.lines().count() <= 1);

        fs::remove_dir_all(&out).ok();
    }
}
