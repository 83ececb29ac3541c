use crate::types::Config;
use anyhow::Result;
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScanDirection;

    #[test]
    fn test_load_full_config() {
        let yaml = r#"
data:
  input_dir: "data/daily"
  output_dir: "output"
  write_jsonl: true
detection:
  min_speed_mph: 40.0
  max_distance_miles: 3.0
  mph_trigger: 20.0
  direction: decreasing
logging:
  level: "debug"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.detection.min_speed_mph, 40.0);
        assert_eq!(config.detection.direction, ScanDirection::Decreasing);
        assert!(config.data.write_jsonl);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_write_jsonl_defaults_off() {
        let yaml = r#"
data:
  input_dir: "in"
  output_dir: "out"
detection:
  min_speed_mph: 35.0
  max_distance_miles: 2.0
  mph_trigger: 15.0
  direction: increasing
logging:
  level: "info"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.data.write_jsonl);
    }
}
