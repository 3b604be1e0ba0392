use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub data_file: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_crs_epsg")]
    pub crs_epsg: u32,
    #[serde(default = "default_geometry_column")]
    pub geometry_column: String,
    #[serde(default = "default_row_id_column")]
    pub row_id_column: String,
    #[serde(default = "default_code_column")]
    pub code_column: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    #[serde(default = "default_state_column")]
    pub state_column: String,
}

impl InputConfig {
    /// The four identity columns excluded from indicator discovery.
    pub fn identity_columns(&self) -> [&str; 4] {
        [
            self.row_id_column.as_str(),
            self.code_column.as_str(),
            self.name_column.as_str(),
            self.state_column.as_str(),
        ]
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassificationConfig {
    pub bands: Vec<BandConfig>,
}

/// One authored classification band. A degenerate entry (min == max) labels
/// missing data instead of matching a coverage range.
#[derive(Debug, Deserialize, Clone)]
pub struct BandConfig {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub color: String, // Hex code
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    #[serde(default = "default_page_mm")]
    pub page_width_mm: f64,
    #[serde(default = "default_page_mm")]
    pub page_height_mm: f64,
    #[serde(default = "default_margin_mm")]
    pub margin_mm: f64,
    #[serde(default = "default_legend_inset_mm")]
    pub legend_inset_mm: f64,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width_mm: default_page_mm(),
            page_height_mm: default_page_mm(),
            margin_mm: default_margin_mm(),
            legend_inset_mm: default_legend_inset_mm(),
            dpi: default_dpi(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub base_dir: PathBuf,
    pub year: u16,
}

fn default_delimiter() -> char {
    ','
}

fn default_crs_epsg() -> u32 {
    4674 // SIRGAS 2000
}

fn default_geometry_column() -> String {
    "geometry".to_string()
}

fn default_row_id_column() -> String {
    "field_1".to_string()
}

fn default_code_column() -> String {
    "CD_MUN".to_string()
}

fn default_name_column() -> String {
    "NM_MUN".to_string()
}

fn default_state_column() -> String {
    "SIGLA_UF".to_string()
}

fn default_page_mm() -> f64 {
    220.0
}

fn default_margin_mm() -> f64 {
    5.0
}

fn default_legend_inset_mm() -> f64 {
    10.0
}

fn default_dpi() -> u32 {
    300
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        if !config.input.delimiter.is_ascii() {
            anyhow::bail!("Field delimiter must be a single ASCII character");
        }
        Ok(config)
    }
}
