use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Demo runner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub logging: LoggingConfig,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Period of the timer-based demos
    pub interval_period_ms: u64,
    /// How long the timer and never demos keep observing
    pub observe_window_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            interval_period_ms: 1000,
            observe_window_ms: 5000,
        }
    }
}

impl DemoConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: DemoConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timing.interval_period_ms == 0 {
            anyhow::bail!("timing.interval_period_ms must be greater than 0");
        }
        match self.logging.format.as_str() {
            "text" | "json" => Ok(()),
            other => anyhow::bail!("logging.format must be 'text' or 'json', got '{}'", other),
        }
    }
}

impl TimingConfig {
    pub fn interval_period(&self) -> Duration {
        Duration::from_millis(self.interval_period_ms)
    }

    pub fn observe_window(&self) -> Duration {
        Duration::from_millis(self.observe_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default_values() {
        let config = DemoConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
        assert_eq!(config.timing.interval_period(), Duration::from_secs(1));
        assert_eq!(config.timing.observe_window(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timing:\n  interval_period_ms: 250\nlogging:\n  format: json").unwrap();

        let config = DemoConfig::from_file(file.path()).unwrap();
        assert_eq!(config.timing.interval_period_ms, 250);
        assert_eq!(config.timing.observe_window_ms, 5000);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timing:\n  interval_period_ms: 0").unwrap();
        assert!(DemoConfig::from_file(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  format: xml").unwrap();
        assert!(DemoConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_config_missing_file() {
        assert!(DemoConfig::from_file("/nonexistent/ripple.yml").is_err());
    }
}
