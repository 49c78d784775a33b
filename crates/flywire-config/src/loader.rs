// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, FlywireConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "flywire_configuration.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `FLYWIRE_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("FLYWIRE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by FLYWIRE_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet FLYWIRE_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<FlywireConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let config: FlywireConfig = toml::from_str(&content)?;

    finish(config, cli_args)
}

/// Like [`load_config`], but falls back to built-in defaults when no file is
/// given and none is found. An explicit `config_path` must exist.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<FlywireConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }
    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(ConfigError::FileNotFound(_)) if env::var("FLYWIRE_CONFIG_PATH").is_err() => {
            finish(FlywireConfig::default(), cli_args)
        }
        Err(e) => Err(e),
    }
}

fn finish(
    mut config: FlywireConfig,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<FlywireConfig> {
    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }
    validate_config(&config)?;
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `FLYWIRE_CONNECTIONS_PATH` -> `input.connections_path`
/// - `FLYWIRE_CLASSIFICATION_PATH` -> `input.classification_path`
/// - `FLYWIRE_OUTPUT_DIR` -> `output.dir`
/// - `FLYWIRE_JSON_FORMAT` -> `output.json_format`
/// - `FLYWIRE_ON_MALFORMED` -> `conversion.on_malformed`
/// - `FLYWIRE_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut FlywireConfig) {
    if let Ok(value) = env::var("FLYWIRE_CONNECTIONS_PATH") {
        config.input.connections_path = PathBuf::from(value);
    }
    if let Ok(value) = env::var("FLYWIRE_CLASSIFICATION_PATH") {
        config.input.classification_path = PathBuf::from(value);
    }
    if let Ok(value) = env::var("FLYWIRE_OUTPUT_DIR") {
        config.output.dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("FLYWIRE_JSON_FORMAT") {
        config.output.json_format = value;
    }
    if let Ok(value) = env::var("FLYWIRE_ON_MALFORMED") {
        config.conversion.on_malformed = value;
    }
    if let Ok(value) = env::var("FLYWIRE_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"output_dir": "out", "json_format": "pretty"}`)
pub fn apply_cli_overrides(config: &mut FlywireConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("connections_path") {
        config.input.connections_path = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("classification_path") {
        config.input.classification_path = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("delimiter") {
        config.input.delimiter = value.clone();
    }
    if let Some(value) = cli_args.get("output_dir") {
        config.output.dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("json_format") {
        config.output.json_format = value.clone();
    }
    if let Some(value) = cli_args.get("on_malformed") {
        config.conversion.on_malformed = value.clone();
    }
    if let Some(value) = cli_args.get("missing_type_label") {
        config.conversion.missing_type_label = Some(value.clone());
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("progress") {
        config.logging.progress = value.to_lowercase() == "true" || value == "1";
    }
}
