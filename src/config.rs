// src/config.rs

//! Defines the configuration structures for the shell.
//!
//! The configuration is read from a JSON file. Every section and field has a
//! default, so a file only needs to name what it changes. Validation (aspect
//! ratio, frame rate) is not done here; it happens when an `App` is built.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file used by the binary.
pub const CONFIG_ENV_VAR: &str = "SHELL2D_CONFIG";

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration of an application window.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// The standard-unit canvas drawn on.
    pub canvas: CanvasConfig,
    /// Frame pacing.
    pub performance: PerformanceConfig,
    /// Text drawing defaults.
    pub text: TextConfig,
}

impl Config {
    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        info!("Loaded configuration from '{}'", path.display());
        Ok(config)
    }

    /// Loads `path` if given. A missing file falls back to the defaults with a
    /// warning; a file that exists but does not parse is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                warn!(
                    "Config file '{}' not found, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }
}

// --- Window Configuration ---

/// Settings for the native window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Window width in device pixels.
    pub width_px: u32,
    /// Window height in device pixels.
    pub height_px: u32,
    /// Optional image used as the window icon.
    pub icon: Option<PathBuf>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: "shell2d".to_string(),
            width_px: 800,
            height_px: 600,
            icon: None,
        }
    }
}

// --- Canvas Configuration ---

/// The resolution-independent canvas. Its aspect ratio must match the window's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    pub standard_width: u32,
    pub standard_height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            standard_width: 400,
            standard_height: 300,
        }
    }
}

// --- Performance Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Frames per second the frame loop is capped at.
    pub target_fps: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig { target_fps: 60 }
    }
}

// --- Text Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Font family used when a draw call does not name one.
    pub default_font: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        TextConfig {
            default_font: "monospace".to_string(),
        }
    }
}
