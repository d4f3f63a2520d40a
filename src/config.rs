// SPDX-License-Identifier: GPL-3.0-or-later
// src/config.rs
//
// Global configuration for the widget, persisted as TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constant;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid color {0:?}, expected #RRGGBB or #RRGGBBAA")]
    Color(String),
}

/// Global configuration for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub widget: WidgetConfig,
    pub overlay: OverlayConfig,
    pub upload: UploadConfig,
    pub export: ExportConfig,
}

/// Feature switches that used to be separate component copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub supports_fixed_crop: bool,
    pub supports_upload: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            supports_fixed_crop: true,
            supports_upload: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Maximum canvas width; larger images are scaled down to fit.
    pub max_canvas_width: u32,
    /// Maximum canvas height; larger images are scaled down to fit.
    pub max_canvas_height: u32,
    /// Edge length of the square used in fixed crop mode.
    pub fixed_crop_size: u32,
    /// Edge length of the selection before the first drag.
    pub initial_selection_size: u32,
    pub capabilities: Capabilities,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            max_canvas_width: constant::MAX_CANVAS_WIDTH,
            max_canvas_height: constant::MAX_CANVAS_HEIGHT,
            fixed_crop_size: constant::FIXED_CROP_SIZE,
            initial_selection_size: constant::INITIAL_SELECTION_SIZE,
            capabilities: Capabilities::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Stroke color as `#RRGGBB` or `#RRGGBBAA`.
    pub stroke_color: String,
    pub stroke_width: u32,
    /// Alternating on/off run lengths; empty means a solid line.
    pub dash: Vec<u32>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            stroke_color: constant::STROKE_COLOR_HEX.to_string(),
            stroke_width: constant::STROKE_WIDTH,
            dash: constant::STROKE_DASH.to_vec(),
        }
    }
}

impl OverlayConfig {
    /// Parse `stroke_color` into RGBA bytes.
    pub fn stroke_rgba(&self) -> Result<[u8; 4], ConfigError> {
        parse_hex_color(&self.stroke_color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub field_name: String,
    pub filename: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: constant::PREDICT_ENDPOINT.to_string(),
            timeout_secs: constant::UPLOAD_TIMEOUT_SECS,
            field_name: constant::UPLOAD_FIELD.to_string(),
            filename: constant::CROP_FILENAME.to_string(),
        }
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving exported crops.
    pub output_dir: PathBuf,
    pub crop_filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs::download_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            crop_filename: constant::CROP_FILENAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Default config file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(constant::CONFIG_DIR).join(constant::CONFIG_FILE))
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load config from `path` or the default location, falling back to defaults
    /// when no file exists. The endpoint env var is applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => {
                    log::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        if let Ok(endpoint) = std::env::var(constant::ENDPOINT_ENV) {
            if !endpoint.is_empty() {
                config.upload.endpoint = endpoint;
            }
        }

        Ok(config)
    }
}

fn parse_hex_color(value: &str) -> Result<[u8; 4], ConfigError> {
    let err = || ConfigError::Color(value.to_string());
    let hex = value.strip_prefix('#').ok_or_else(err)?;
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return Err(err());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
    let alpha = if hex.len() == 8 { channel(6)? } else { 0xFF };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = AppConfig::default();
        assert_eq!(config.widget.max_canvas_width, 1200);
        assert_eq!(config.widget.max_canvas_height, 1000);
        assert_eq!(config.widget.fixed_crop_size, 660);
        assert_eq!(config.overlay.stroke_rgba().unwrap(), constant::STROKE_COLOR);
        assert_eq!(config.upload.field_name, "file");
    }

    #[test]
    fn stroke_hex_matches_rgba() {
        assert_eq!(
            parse_hex_color(constant::STROKE_COLOR_HEX).unwrap(),
            constant::STROKE_COLOR
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [widget]
            fixed_crop_size = 400

            [widget.capabilities]
            supports_upload = false

            [upload]
            endpoint = "http://10.0.0.1:5001/predict"
            "#,
        )
        .unwrap();

        assert_eq!(config.widget.fixed_crop_size, 400);
        assert_eq!(config.widget.max_canvas_width, 1200);
        assert!(config.widget.capabilities.supports_fixed_crop);
        assert!(!config.widget.capabilities.supports_upload);
        assert_eq!(config.upload.endpoint, "http://10.0.0.1:5001/predict");
        assert_eq!(config.upload.filename, constant::CROP_FILENAME);
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#102030").unwrap(), [0x10, 0x20, 0x30, 0xFF]);
        assert_eq!(parse_hex_color("#10203040").unwrap(), [0x10, 0x20, 0x30, 0x40]);
        assert!(parse_hex_color("102030").is_err());
        assert!(parse_hex_color("#1020").is_err());
        assert!(parse_hex_color("#zz2030").is_err());
    }
}
