//! Configuration loading and management
//!
//! Handles parsing of `planviz.toml` from the data directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::storage::Storage;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Report composition tunables
    #[serde(default)]
    pub report: ReportConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report: ReportConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Report composition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Bars at least this fraction of the timeline range carry their
    /// label inside the bar
    #[serde(default = "default_label_inside_fraction")]
    pub label_inside_fraction: f64,

    /// Bars at least this fraction of the timeline range carry their
    /// label beside the bar
    #[serde(default = "default_label_beside_fraction")]
    pub label_beside_fraction: f64,

    /// Gap between a bar and its beside label, as a fraction of the range
    #[serde(default = "default_label_offset_fraction")]
    pub label_offset_fraction: f64,
}

fn default_label_inside_fraction() -> f64 {
    0.08
}

fn default_label_beside_fraction() -> f64 {
    0.02
}

fn default_label_offset_fraction() -> f64 {
    0.01
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            label_inside_fraction: default_label_inside_fraction(),
            label_beside_fraction: default_label_beside_fraction(),
            label_offset_fraction: default_label_offset_fraction(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for rendered reports, relative to the data directory
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

fn default_output_directory() -> String {
    "reports".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

impl Config {
    /// Load configuration from a `planviz.toml` file
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        // Malformed files surface as user errors, same as failed validation
        let config: Config = toml::from_str(&content)
            .map_err(|err| crate::error::Error::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults when
    /// no file exists. A present but invalid file is an error.
    pub fn load_or_default(storage: &Storage) -> crate::error::Result<Self> {
        let config_path = storage.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &PathBuf) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.report.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

impl ReportConfig {
    fn validate(&self) -> crate::error::Result<()> {
        validate_fraction(self.label_inside_fraction, "report.label_inside_fraction")?;
        validate_fraction(self.label_beside_fraction, "report.label_beside_fraction")?;
        if self.label_inside_fraction < self.label_beside_fraction {
            return Err(crate::error::Error::InvalidConfig(
                "report.label_inside_fraction must be >= report.label_beside_fraction"
                    .to_string(),
            ));
        }
        if !(self.label_offset_fraction >= 0.0 && self.label_offset_fraction <= 1.0) {
            return Err(crate::error::Error::InvalidConfig(format!(
                "report.label_offset_fraction must be within [0, 1], got {}",
                self.label_offset_fraction
            )));
        }
        Ok(())
    }
}

fn validate_fraction(value: f64, field: &str) -> crate::error::Result<()> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field} must be within (0, 1], got {value}"
        )));
    }
    Ok(())
}

impl OutputConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.directory.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "output.directory cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.report.label_inside_fraction, 0.08);
        assert_eq!(cfg.report.label_beside_fraction, 0.02);
        assert_eq!(cfg.report.label_offset_fraction, 0.01);
        assert_eq!(cfg.output.directory, "reports");
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("planviz.toml");
        let content = r#"
[report]
label_inside_fraction = 0.15
label_beside_fraction = 0.05
label_offset_fraction = 0.02

[output]
directory = "rendered"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.report.label_inside_fraction, 0.15);
        assert_eq!(cfg.report.label_beside_fraction, 0.05);
        assert_eq!(cfg.report.label_offset_fraction, 0.02);
        assert_eq!(cfg.output.directory, "rendered");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("planviz.toml");
        fs::write(&path, "[report]\nlabel_inside_fraction = 0.2").expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.report.label_inside_fraction, 0.2);
        assert_eq!(cfg.report.label_beside_fraction, 0.02);
        assert_eq!(cfg.output.directory, "reports");
    }

    #[test]
    fn malformed_file_rejected_as_invalid_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("planviz.toml");
        fs::write(&path, "not [ valid toml").expect("write config");

        let err = Config::load(&path).expect_err("malformed config");
        assert_eq!(err.exit_code(), crate::error::exit_codes::USER_ERROR);
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_fraction_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("planviz.toml");
        fs::write(&path, "[report]\nlabel_inside_fraction = 1.5").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(msg) => {
                assert!(msg.contains("label_inside_fraction"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inside_below_beside_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("planviz.toml");
        let content = "[report]\nlabel_inside_fraction = 0.01\nlabel_beside_fraction = 0.05";
        fs::write(&path, content).expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_output_directory_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("planviz.toml");
        fs::write(&path, "[output]\ndirectory = \"  \"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(msg) => assert!(msg.contains("output.directory")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_or_default_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        let cfg = Config::load_or_default(&storage).expect("load");
        assert_eq!(cfg.report.label_inside_fraction, 0.08);
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        fs::write(
            storage.config_file(),
            "[report]\nlabel_inside_fraction = 0.25",
        )
        .expect("write config");

        let cfg = Config::load_or_default(&storage).expect("load");
        assert_eq!(cfg.report.label_inside_fraction, 0.25);
    }

    #[test]
    fn load_or_default_propagates_invalid_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        fs::write(storage.config_file(), "[report]\nlabel_beside_fraction = 0.0")
            .expect("write config");

        assert!(Config::load_or_default(&storage).is_err());
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        let cfg = Config::default();
        cfg.save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("label_inside_fraction = 0.08"));
        assert!(written.contains("directory = \"reports\""));
    }
}
