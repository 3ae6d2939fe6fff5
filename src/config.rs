use serde::Deserialize;
use std::fs;

pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatcherConfig {
    /// Per-manufacturer listing queue.
    pub listing_queue_capacity: usize,
    /// Shared stream of finished results.
    pub result_queue_capacity: usize,
    /// Input file readers to the dispatcher.
    pub reader_queue_capacity: usize,
    /// Write results ordered by product name instead of completion order.
    pub sort_output: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            listing_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            result_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            reader_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            sort_output: false,
        }
    }
}

pub fn load_config(path: &str) -> Result<MatcherConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: MatcherConfig = serde_json::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"listing_queue_capacity": 8, "sort_output": true}"#).unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.listing_queue_capacity, 8);
        assert_eq!(config.result_queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.sort_output);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config("/definitely/not/here.json").is_err());
    }
}
