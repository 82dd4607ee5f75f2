//! Toll rate configuration.
//!
//! Rate tables are passed to the toll transforms explicitly. They can be
//! built in code, taken from the stock defaults, or read from a TOML file:
//!
//! ```toml
//! [flat_rates]
//! car = 0.1
//! truck = 0.2
//!
//! [[time_windows]]
//! start_hour = 0
//! end_hour = 6
//! rates = { car = 0.1, truck = 0.2 }
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{TransformError, TransformResult};

/// File name searched by [`TollConfig::load_default`].
pub const DEFAULT_CONFIG_FILE: &str = "toll.toml";

/// Hours in the day covered by the time windows.
pub const HOURS_PER_DAY: u32 = 24;

/// Per-vehicle-type rate applied to the whole distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatRates(BTreeMap<String, f64>);

impl FlatRates {
    pub fn new<I, S>(rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self(rates.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn rate(&self, vehicle_type: &str) -> Option<f64> {
        self.0.get(vehicle_type).copied()
    }

    pub fn vehicle_types(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn validate(&self) -> TransformResult<()> {
        match self.0.iter().find(|(_, rate)| !rate.is_finite() || **rate < 0.0) {
            Some((vehicle_type, rate)) => Err(TransformError::Config(format!(
                "Flat rate for '{}' must be a non-negative number, got {}",
                vehicle_type, rate
            ))),
            None => Ok(()),
        }
    }
}

impl Default for FlatRates {
    fn default() -> Self {
        Self::new([("car", 0.1), ("truck", 0.2)])
    }
}

/// Half-open hour interval `[start_hour, end_hour)` with its own rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

impl TimeWindow {
    pub fn new<I, S>(start_hour: u32, end_hour: u32, rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            start_hour,
            end_hour,
            rates: rates.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }
}

/// Time windows that partition the day, sorted by start hour.
///
/// Construction rejects gaps, overlaps, empty windows and windows reaching
/// past hour 24, so every hour of the day maps to exactly one window.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindowRates {
    windows: Vec<TimeWindow>,
}

impl TimeWindowRates {
    pub fn new(mut windows: Vec<TimeWindow>) -> TransformResult<Self> {
        windows.sort_by_key(|w| w.start_hour);

        let mut expected_start = 0;
        for window in &windows {
            if window.start_hour != expected_start {
                return Err(TransformError::Config(format!(
                    "Time windows must be contiguous: expected a window starting at hour {}, found {}",
                    expected_start, window.start_hour
                )));
            }
            if window.end_hour <= window.start_hour || window.end_hour > HOURS_PER_DAY {
                return Err(TransformError::Config(format!(
                    "Invalid time window [{}, {})",
                    window.start_hour, window.end_hour
                )));
            }
            if let Some((vehicle_type, rate)) = window
                .rates
                .iter()
                .find(|(_, rate)| !rate.is_finite() || **rate < 0.0)
            {
                return Err(TransformError::Config(format!(
                    "Rate for '{}' in window [{}, {}) must be a non-negative number, got {}",
                    vehicle_type, window.start_hour, window.end_hour, rate
                )));
            }
            expected_start = window.end_hour;
        }
        if expected_start != HOURS_PER_DAY {
            return Err(TransformError::Config(format!(
                "Time windows must cover the whole day, coverage stops at hour {}",
                expected_start
            )));
        }

        Ok(Self { windows })
    }

    /// Window containing `hour`, found by binary search over the partition.
    pub fn window_for(&self, hour: u32) -> Option<&TimeWindow> {
        let index = self.windows.partition_point(|w| w.end_hour <= hour);
        self.windows.get(index).filter(|w| w.contains(hour))
    }

    /// Rate for `vehicle_type` at `hour`, if the type is priced in that window.
    pub fn rate(&self, hour: u32, vehicle_type: &str) -> Option<f64> {
        self.window_for(hour)
            .and_then(|w| w.rates.get(vehicle_type).copied())
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }
}

impl Default for TimeWindowRates {
    fn default() -> Self {
        Self {
            windows: default_time_windows(),
        }
    }
}

fn default_time_windows() -> Vec<TimeWindow> {
    vec![
        TimeWindow::new(0, 6, [("car", 0.1), ("truck", 0.2)]),
        TimeWindow::new(6, 12, [("car", 0.2), ("truck", 0.3)]),
        TimeWindow::new(12, 18, [("car", 0.15), ("truck", 0.25)]),
        TimeWindow::new(18, 24, [("car", 0.25), ("truck", 0.35)]),
    ]
}

/// Toll configuration from file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TollConfig {
    #[serde(default)]
    pub flat_rates: FlatRates,
    #[serde(default = "default_time_windows")]
    pub time_windows: Vec<TimeWindow>,
}

impl Default for TollConfig {
    fn default() -> Self {
        Self {
            flat_rates: FlatRates::default(),
            time_windows: default_time_windows(),
        }
    }
}

impl TollConfig {
    /// Load toll configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(TollConfig)` if the file parses and its rate tables are valid
    /// * `Err(TransformError::Config)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> TransformResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TransformError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config = Self::from_toml_str(&content)?;
        info!("Loaded toll configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate toll configuration from TOML text.
    pub fn from_toml_str(content: &str) -> TransformResult<Self> {
        let config: TollConfig = toml::from_str(content).map_err(|e| {
            TransformError::Config(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load toll configuration from the default location.
    ///
    /// Searches for `toll.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    ///
    /// Falls back to the built-in rates when neither file exists.
    pub fn load_default() -> TransformResult<Self> {
        match Self::find_config_file() {
            Some(path) => Self::from_file(path),
            None => {
                info!("No {} found, using built-in toll rates", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    fn find_config_file() -> Option<PathBuf> {
        [
            PathBuf::from(DEFAULT_CONFIG_FILE),
            Path::new("rust_backend").join(DEFAULT_CONFIG_FILE),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Check both rate tables without keeping the converted windows.
    pub fn validate(&self) -> TransformResult<()> {
        self.flat_rates.validate()?;
        self.time_window_rates().map(|_| ())
    }

    pub fn time_window_rates(&self) -> TransformResult<TimeWindowRates> {
        TimeWindowRates::new(self.time_windows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_windows_partition_the_day() {
        let rates = TimeWindowRates::default();
        for hour in 0..HOURS_PER_DAY {
            let window = rates.window_for(hour).unwrap();
            assert!(window.contains(hour));
        }
        assert!(rates.window_for(24).is_none());
    }

    #[test]
    fn test_window_lookup_boundaries() {
        let rates = TimeWindowRates::default();
        assert_eq!(rates.window_for(5).unwrap().start_hour, 0);
        assert_eq!(rates.window_for(6).unwrap().start_hour, 6);
        assert_eq!(rates.window_for(23).unwrap().start_hour, 18);
        assert_eq!(rates.rate(7, "truck"), Some(0.3));
        assert_eq!(rates.rate(7, "bike"), None);
    }

    #[test]
    fn test_time_windows_are_sorted_on_construction() {
        let rates = TimeWindowRates::new(vec![
            TimeWindow::new(12, 24, [("car", 2.0)]),
            TimeWindow::new(0, 12, [("car", 1.0)]),
        ])
        .unwrap();
        assert_eq!(rates.windows()[0].start_hour, 0);
        assert_eq!(rates.rate(13, "car"), Some(2.0));
    }

    #[test]
    fn test_time_windows_reject_gaps_and_overlaps() {
        let gap = TimeWindowRates::new(vec![
            TimeWindow::new(0, 6, [("car", 1.0)]),
            TimeWindow::new(7, 24, [("car", 1.0)]),
        ]);
        assert!(matches!(gap, Err(TransformError::Config(_))));

        let overlap = TimeWindowRates::new(vec![
            TimeWindow::new(0, 12, [("car", 1.0)]),
            TimeWindow::new(10, 24, [("car", 1.0)]),
        ]);
        assert!(matches!(overlap, Err(TransformError::Config(_))));

        let short = TimeWindowRates::new(vec![TimeWindow::new(0, 18, [("car", 1.0)])]);
        assert!(matches!(short, Err(TransformError::Config(_))));

        let past_midnight = TimeWindowRates::new(vec![TimeWindow::new(0, 25, [("car", 1.0)])]);
        assert!(matches!(past_midnight, Err(TransformError::Config(_))));
    }

    #[test]
    fn test_negative_rates_are_rejected() {
        let windows = TimeWindowRates::new(vec![TimeWindow::new(0, 24, [("car", -1.0)])]);
        assert!(matches!(windows, Err(TransformError::Config(_))));

        let config = TollConfig {
            flat_rates: FlatRates::new([("car", -0.1)]),
            ..TollConfig::default()
        };
        assert!(matches!(config.validate(), Err(TransformError::Config(_))));
    }

    #[test]
    fn test_from_toml_str_with_defaults() {
        let config = TollConfig::from_toml_str("[flat_rates]\nvan = 0.15\n").unwrap();
        assert_eq!(config.flat_rates.rate("van"), Some(0.15));
        assert_eq!(config.flat_rates.rate("car"), None);
        assert_eq!(config.time_windows.len(), 4);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[flat_rates]
car = 0.5

[[time_windows]]
start_hour = 0
end_hour = 12
rates = {{ car = 1.0 }}

[[time_windows]]
start_hour = 12
end_hour = 24
rates = {{ car = 2.0, truck = 3.0 }}
"#
        )
        .unwrap();

        let config = TollConfig::from_file(file.path()).unwrap();
        assert_eq!(config.flat_rates.rate("car"), Some(0.5));
        let windows = config.time_window_rates().unwrap();
        assert_eq!(windows.rate(18, "truck"), Some(3.0));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TollConfig::from_toml_str("[flat_rates\ncar = ");
        assert!(matches!(result, Err(TransformError::Config(_))));
    }
}
