//! # Configuration Module
//!
//! Settings of a lineup run, loaded from a JSON file and overridden by
//! command-line flags.
//!
//! ## Location
//!
//! The default file lives in the platform configuration directory:
//! - Linux: `~/.config/lineup/config.json`
//! - macOS: `~/Library/Application Support/lineup/config.json`
//! - Windows: `%APPDATA%\lineup\config.json`
//!
//! A missing file means all defaults. Unknown keys are rejected.
//!
//! Before a run the merged settings are frozen into [`MatchOptions`],
//! [`SequenceSpec`] and [`NameTemplate`] values; nothing downstream reads the
//! configuration directly.

use crate::error::{LineupError, Result};
use crate::export::{ExportMode, ExportSettings, FilenameMode, OutputFormat};
use crate::matcher::MatchOptions;
use crate::sequence::{Direction, NameTemplate, SequenceSpec, NUMBER_PLACEHOLDER};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";

/// Returns the platform-appropriate configuration file path.
///
/// The directory is not created here; see [`LineupConfig::save`].
///
/// # Errors
///
/// Fails when the platform has no standard configuration directory.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        LineupError::Config(
            "Could not determine system config directory. Use --config to pass a file explicitly."
                .to_string(),
        )
    })?;

    Ok(config_dir.join("lineup").join(CONFIG_FILE_NAME))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameMode {
    /// `{number}{separator}{original name}`
    #[default]
    Prefix,
    /// Custom pattern with a `[Num]` placeholder.
    Format,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenameConfig {
    pub mode: RenameMode,
    pub separator: String,
    pub pattern: String,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            mode: RenameMode::Prefix,
            separator: "-".to_string(),
            pattern: NUMBER_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequenceConfig {
    pub start: i64,
    pub step: i64,
    /// Count down from `end` instead of up from `start`.
    pub reverse: bool,
    pub end: i64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            start: 1,
            step: 1,
            reverse: false,
            end: 1,
        }
    }
}

/// Persistent settings for lineup runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineupConfig {
    /// Candidates must score strictly above this, in `[0, 1]`.
    pub threshold: f64,
    pub auto_select_highest: bool,
    pub ignore_directories: bool,
    /// Write the report only, without copying anything.
    pub list_only: bool,
    pub output_format: OutputFormat,
    pub filename_mode: FilenameMode,
    pub output_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub rename: RenameConfig,
    pub sequence: SequenceConfig,
}

impl Default for LineupConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            auto_select_highest: false,
            ignore_directories: false,
            list_only: false,
            output_format: OutputFormat::Text,
            filename_mode: FilenameMode::Relative,
            output_dir: None,
            output_file: None,
            rename: RenameConfig::default(),
            sequence: SequenceConfig::default(),
        }
    }
}

impl LineupConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicitly given file must exist; a missing default file yields
    /// the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (get_config_path()?, false),
        };

        if !path.exists() {
            if explicit {
                return Err(LineupError::Config(format!(
                    "Config file {} does not exist",
                    path.display()
                )));
            }
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            LineupError::Config(format!("Invalid config file {}: {e}", path.display()))
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Matching parameters, after checking the threshold range.
    pub fn match_options(&self) -> Result<MatchOptions> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(LineupError::InvalidThreshold(self.threshold));
        }
        Ok(MatchOptions {
            threshold: self.threshold,
            auto_select_highest: self.auto_select_highest,
        })
    }

    pub fn sequence_spec(&self) -> SequenceSpec {
        SequenceSpec {
            direction: if self.sequence.reverse {
                Direction::Descending
            } else {
                Direction::Ascending
            },
            start: self.sequence.start,
            end: self.sequence.end,
            step: self.sequence.step,
        }
    }

    pub fn name_template(&self) -> NameTemplate {
        match self.rename.mode {
            RenameMode::Prefix => NameTemplate::Prefix {
                separator: self.rename.separator.clone(),
            },
            RenameMode::Format => NameTemplate::CustomFormat {
                pattern: self.rename.pattern.clone(),
            },
        }
    }

    pub fn export_mode(&self) -> ExportMode {
        if self.list_only {
            ExportMode::ListOnly
        } else {
            ExportMode::Full
        }
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            format: self.output_format,
            filename_mode: self.filename_mode,
            mode: self.export_mode(),
            output_dir: self.output_dir.clone(),
            output_file: self.output_file.clone(),
            threshold: self.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_config_path_structure() {
        if let Ok(path) = get_config_path() {
            assert!(path.ends_with("lineup/config.json"));
        }
    }

    #[test]
    fn test_defaults() {
        let config = LineupConfig::default();
        assert_eq!(config.threshold, 0.6);
        assert_eq!(config.name_template(), NameTemplate::default());
        assert_eq!(config.sequence_spec(), SequenceSpec::default());
        assert_eq!(config.export_mode(), ExportMode::Full);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "threshold": 0.8, "output_format": "m3u", "sequence": { "reverse": true, "end": 9 } }"#,
        )?;

        let config = LineupConfig::load(Some(&path))?;
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.output_format, OutputFormat::M3u);
        assert_eq!(config.sequence.end, 9);
        assert_eq!(config.sequence.step, 1);
        assert_eq!(config.sequence_spec().direction, Direction::Descending);
        assert_eq!(config.rename.separator, "-");
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("config.json");
        let mut config = LineupConfig::default();
        config.rename.mode = RenameMode::Format;
        config.rename.pattern = "Track [Num]".to_string();

        config.save(&path)?;
        assert_eq!(LineupConfig::load(Some(&path))?, config);
        assert_eq!(
            config.name_template(),
            NameTemplate::CustomFormat {
                pattern: "Track [Num]".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn test_unknown_keys_are_rejected() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "treshold": 0.8 }"#)?;

        assert!(matches!(LineupConfig::load(Some(&path)), Err(LineupError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = LineupConfig::load(Some(Path::new("/definitely/not/here.json")));
        assert!(matches!(result, Err(LineupError::Config(_))));
    }

    #[test]
    fn test_threshold_range_is_checked() {
        let mut config = LineupConfig::default();
        config.threshold = 1.5;
        assert!(matches!(config.match_options(), Err(LineupError::InvalidThreshold(_))));

        config.threshold = 0.0;
        assert!(config.match_options().is_ok());

        config.threshold = f64::NAN;
        assert!(config.match_options().is_err());
    }
}
