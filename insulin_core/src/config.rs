//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/smart-insulin/config.toml`.

use crate::{AdjustmentStep, Error, InsulinType, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub clinic: ClinicConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Who signs the worksheet
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ClinicConfig {
    #[serde(default)]
    pub clinician: Option<String>,

    #[serde(default)]
    pub facility: Option<String>,
}

/// Defaults used when the command line leaves a choice open
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub insulin_type: InsulinType,

    #[serde(default)]
    pub adjustment_step: AdjustmentStep,
}

/// Worksheet report layout
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_lines_per_page")]
    pub lines_per_page: usize,

    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: usize,

    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,

    /// Relative output paths are resolved against this directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            lines_per_page: default_lines_per_page(),
            bottom_margin: default_bottom_margin(),
            disclaimer: default_disclaimer(),
            output_dir: None,
        }
    }
}

// Default value functions
fn default_title() -> String {
    "SMART Insulin Worksheet".into()
}

fn default_lines_per_page() -> usize {
    60
}

fn default_bottom_margin() -> usize {
    4
}

fn default_disclaimer() -> String {
    "Recommendations are calculated from fixed formulas and must be reviewed \
     by the treating clinician before use. Adjust for renal function, \
     intercurrent illness and meal pattern."
        .into()
}

/// Smallest usable page: continuation header plus a few body lines
const MIN_USABLE_LINES: usize = 8;

impl Config {
    /// Load configuration from `path`, falling back to defaults if absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("smart-insulin").join("config.toml")
    }

    /// Check values serde cannot express
    pub fn validate(&self) -> Result<()> {
        let report = &self.report;
        if report.lines_per_page < report.bottom_margin + MIN_USABLE_LINES {
            return Err(Error::Config(format!(
                "report.lines_per_page ({}) must leave at least {} lines above the bottom margin ({})",
                report.lines_per_page, MIN_USABLE_LINES, report.bottom_margin
            )));
        }
        Ok(())
    }

    /// Resolve a report/export path against `report.output_dir`
    pub fn resolve_output_path(&self, path: &Path) -> PathBuf {
        match &self.report.output_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.insulin_type, InsulinType::Rapid);
        assert_eq!(config.defaults.adjustment_step, AdjustmentStep::Ten);
        assert_eq!(config.report.lines_per_page, 60);
        assert!(config.clinic.clinician.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.clinic.clinician = Some("Dr A. Rao".into());
        let toml_str = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.clinic.clinician, config.clinic.clinician);
        assert_eq!(parsed.report.disclaimer, config.report.disclaimer);
        assert_eq!(parsed.defaults.adjustment_step, config.defaults.adjustment_step);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[defaults]
insulin_type = "regular"
adjustment_step = 20
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.defaults.insulin_type, InsulinType::Regular);
        assert_eq!(config.defaults.adjustment_step, AdjustmentStep::Twenty);
        assert_eq!(config.report.lines_per_page, 60); // default
    }

    #[test]
    fn test_invalid_step_rejected() {
        let toml_str = "[defaults]\nadjustment_step = 12\n";
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_page_too_short_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[report]\nlines_per_page = 10\nbottom_margin = 4\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.clinic.facility = Some("Diabetes Clinic".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.clinic.facility.as_deref(), Some("Diabetes Clinic"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.report.lines_per_page, 60);
    }

    #[test]
    fn test_resolve_output_path() {
        let mut config = Config::default();
        assert_eq!(
            config.resolve_output_path(Path::new("sheet.txt")),
            PathBuf::from("sheet.txt")
        );

        config.report.output_dir = Some(PathBuf::from("/srv/reports"));
        assert_eq!(
            config.resolve_output_path(Path::new("sheet.txt")),
            PathBuf::from("/srv/reports/sheet.txt")
        );
        assert_eq!(
            config.resolve_output_path(Path::new("/tmp/sheet.txt")),
            PathBuf::from("/tmp/sheet.txt")
        );
    }
}
