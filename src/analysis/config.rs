//! Chart configuration loaded from chart_config.json.
//!
//! If the config file doesn't exist, default values are used.
//! The file is read fresh on every chart export, so edits take effect
//! without restarting.

use anyhow::{Context, Result};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Chart configuration with all customizable values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub font: FontConfig,
    pub colors: ColorConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub title_size: u32,
    pub axis_label_size: u32,
    /// Value labels drawn above bars
    pub bar_label_size: u32,
}

/// Colors as [R, G, B].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub bar_fill: [u8; 3],
    /// Bars for the most played numbers
    pub highlight: [u8; 3],
    pub background: [u8; 3],
    pub grid: [u8; 3],
    /// One color per prize rank, first to fifth
    pub ranks: [[u8; 3]; 5],
    pub no_win: [u8; 3],
    pub undetermined: [u8; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub chart_width: u32,
    pub chart_height: u32,
    pub margin: u32,
    /// How many top numbers get the highlight color
    pub highlight_top: usize,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            title_size: 28,
            axis_label_size: 14,
            bar_label_size: 12,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            bar_fill: [52, 152, 219],  // #3498DB
            highlight: [231, 76, 60],  // #E74C3C
            background: [250, 250, 250],
            grid: [220, 220, 220],
            ranks: [
                [241, 196, 15],
                [230, 126, 34],
                [155, 89, 182],
                [46, 204, 113],
                [26, 188, 156],
            ],
            no_win: [149, 165, 166],
            undetermined: [189, 195, 199],
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            chart_width: 1000,
            chart_height: 600,
            margin: 20,
            highlight_top: 6,
        }
    }
}

/// Converts a config triple to a plotters color.
pub fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

impl ChartConfig {
    /// Load config from file, or return defaults if file doesn't exist.
    pub fn load(config_path: &Path) -> Self {
        if !config_path.exists() {
            return Self::default();
        }
        match fs::read_to_string(config_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded chart config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse chart config: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read chart config: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Save default config to file (for reference).
    pub fn save_default(config_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&Self::default())
            .context("Failed to serialize default chart config")?;
        fs::write(config_path, json)
            .with_context(|| format!("Failed to write {}", config_path.display()))
    }
}
