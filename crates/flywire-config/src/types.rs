// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `flywire_configuration.toml`. Every
//! section is `#[serde(default)]`, so a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FlywireConfig {
    pub input: InputConfig,
    pub columns: ColumnsConfig,
    pub conversion: ConversionConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Locations and format of the FlyWire CSV downloads
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub connections_path: PathBuf,
    pub classification_path: PathBuf,
    /// Single-character field delimiter
    pub delimiter: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            connections_path: PathBuf::from("./Data/connections.csv"),
            classification_path: PathBuf::from("./Data/classification.csv"),
            delimiter: ",".to_string(),
        }
    }
}

/// Header names in the input tables
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub source: String,
    pub target: String,
    pub strength: String,
    pub connection_type: String,
    pub classification_id: String,
    pub classification_class: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            source: "pre_root_id".to_string(),
            target: "post_root_id".to_string(),
            strength: "syn_count".to_string(),
            connection_type: "nt_type".to_string(),
            classification_id: "root_id".to_string(),
            classification_class: "class".to_string(),
        }
    }
}

/// Row handling and batch settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// "skip" or "abort"
    pub on_malformed: String,
    /// Label used for rows with an empty connection type; `None` rejects them
    pub missing_type_label: Option<String>,
    /// Classes converted by the `regions` batch command
    pub regions: Vec<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            on_malformed: "skip".to_string(),
            missing_type_label: None,
            regions: vec![
                "olfactory".to_string(),
                "ALPN".to_string(),
                "LHLN".to_string(),
                "LHCENT".to_string(),
            ],
        }
    }
}

/// Where and how converted documents are written
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// "compact" or "pretty"
    pub json_format: String,
    /// Appended to the region name: `<region><suffix>.json`
    pub file_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            json_format: "compact".to_string(),
            file_suffix: "_connections".to_string(),
        }
    }
}

impl OutputConfig {
    /// Output path of one region in batch mode
    pub fn region_path(&self, region: &str) -> PathBuf {
        self.dir.join(format!("{}{}.json", region, self.file_suffix))
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for crates without a debug flag
    pub level: String,
    /// Show progress bars on stderr
    pub progress: bool,
    /// Directory for JSON log files (only with file logging enabled)
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            progress: true,
            log_dir: None,
        }
    }
}
