//! Configuration types for inkaux engine.
//!
//! This module defines the configuration schema for both tools: the icon
//! sheet composer (grid geometry, template, categories) and the WMF
//! converter glue (which binaries to look for, what to call the tool).

use crate::sheet::InjectionPoint;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::Path;

/// Main configuration for inkaux.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Icon sheet composer settings.
    #[serde(default)]
    pub sheets: SheetConfig,

    /// WMF converter settings.
    #[serde(default)]
    pub converter: ConverterConfig,
}

/// Settings for composing icon sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Template file name, relative to the sheet root.
    #[serde(default = "default_template_name")]
    pub template_name: String,

    /// Top-level directories that are never treated as themes.
    #[serde(default = "default_excluded_themes")]
    pub excluded_themes: Vec<String>,

    /// Category directories collected into each sheet, in order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Rendered icon width and height.
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,

    /// Export resolution recorded on each image.
    #[serde(default = "default_resolution")]
    pub resolution: u32,

    /// Icons per row.
    #[serde(default = "default_columns")]
    pub columns: u32,

    /// Horizontal space between icons.
    #[serde(default = "default_column_gap")]
    pub column_gap: u32,

    /// Vertical space between rows, room for the caption.
    #[serde(default = "default_row_gap")]
    pub row_gap: u32,

    /// CSS applied to the caption under each icon.
    #[serde(default = "default_label_style")]
    pub label_style: String,

    /// Where generated elements go in the template.
    #[serde(default)]
    pub injection: InjectionPoint,
}

fn default_template_name() -> String {
    "theme-variant.svg".into()
}

fn default_excluded_themes() -> Vec<String> {
    vec!["application".into()]
}

fn default_categories() -> Vec<String> {
    vec!["actions".into()]
}

fn default_icon_size() -> u32 {
    16
}

fn default_resolution() -> u32 {
    900
}

fn default_columns() -> u32 {
    8
}

fn default_column_gap() -> u32 {
    5
}

fn default_row_gap() -> u32 {
    10
}

fn default_label_style() -> String {
    "font-size:1.46667px;text-align:center;text-anchor:middle;white-space:pre;\
     inline-size:13.3136;fill:#333333;stroke:none"
        .into()
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            template_name: default_template_name(),
            excluded_themes: default_excluded_themes(),
            categories: default_categories(),
            icon_size: default_icon_size(),
            resolution: default_resolution(),
            columns: default_columns(),
            column_gap: default_column_gap(),
            row_gap: default_row_gap(),
            label_style: default_label_style(),
            injection: InjectionPoint::default(),
        }
    }
}

impl SheetConfig {
    /// Reject settings that cannot produce a grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::Invalid("columns must be at least 1".into()));
        }
        if self.icon_size == 0 {
            return Err(ConfigError::Invalid("icon_size must be at least 1".into()));
        }
        if self.template_name.trim().is_empty() {
            return Err(ConfigError::Invalid("template_name is empty".into()));
        }
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one category is required".into(),
            ));
        }
        if let InjectionPoint::Marker(marker) = &self.injection {
            if marker.is_empty() {
                return Err(ConfigError::Invalid("injection marker is empty".into()));
            }
        }
        Ok(())
    }

    /// Whether a top-level directory name is excluded from theme scanning.
    pub fn is_excluded(&self, name: impl AsRef<OsStr>) -> bool {
        let name = name.as_ref();
        self.excluded_themes.iter().any(|t| name == t.as_str())
    }
}

/// Settings for the WMF converter glue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Converter executables tried on PATH, first match wins.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Name used in failure messages.
    #[serde(default = "default_tool_label")]
    pub tool_label: String,

    /// Extension of the produced file, including the dot.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

fn default_candidates() -> Vec<String> {
    vec!["uniconvertor".into(), "uniconv".into()]
}

fn default_tool_label() -> String {
    "UniConvertor".into()
}

fn default_output_extension() -> String {
    ".wmf".into()
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            tool_label: default_tool_label(),
            output_extension: default_output_extension(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.sheets.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Config parsed but holds unusable values.
    #[error("Invalid config: {0}")]
    Invalid(String),
}
