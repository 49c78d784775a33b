// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem before failing so a broken file is fixed in one go.

use crate::{ConfigError, ConfigResult, FlywireConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    DuplicateColumn { column: String, fields: (String, String) },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::DuplicateColumn { column, fields } => {
                write!(
                    f,
                    "Column '{}' is used by both {} and {}",
                    column, fields.0, fields.1
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &FlywireConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// All validation problems of `config`, in section order
pub fn collect_errors(config: &FlywireConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_input(config, &mut errors);
    validate_columns(config, &mut errors);
    validate_conversion(config, &mut errors);
    validate_output(config, &mut errors);
    errors
}

fn validate_input(config: &FlywireConfig, errors: &mut Vec<ConfigValidationError>) {
    let delimiter = &config.input.delimiter;
    if delimiter.len() != 1 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "input.delimiter".to_string(),
            reason: format!("'{}' must be a single ASCII character", delimiter),
        });
    }
}

fn validate_columns(config: &FlywireConfig, errors: &mut Vec<ConfigValidationError>) {
    let columns = &config.columns;
    let connection_columns = [
        ("columns.source", &columns.source),
        ("columns.target", &columns.target),
        ("columns.strength", &columns.strength),
        ("columns.connection_type", &columns.connection_type),
    ];
    let classification_columns = [
        ("columns.classification_id", &columns.classification_id),
        ("columns.classification_class", &columns.classification_class),
    ];

    for (field, value) in connection_columns.iter().chain(classification_columns.iter()) {
        if value.trim().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: field.to_string(),
            });
        }
    }

    // Each table's columns must be distinct within that table
    for table in [&connection_columns[..], &classification_columns[..]] {
        for (i, (first_field, first)) in table.iter().enumerate() {
            for (second_field, second) in &table[i + 1..] {
                if !first.is_empty() && first == second {
                    errors.push(ConfigValidationError::DuplicateColumn {
                        column: first.to_string(),
                        fields: (first_field.to_string(), second_field.to_string()),
                    });
                }
            }
        }
    }
}

fn validate_conversion(config: &FlywireConfig, errors: &mut Vec<ConfigValidationError>) {
    let conversion = &config.conversion;
    if !matches!(conversion.on_malformed.to_lowercase().as_str(), "skip" | "abort") {
        errors.push(ConfigValidationError::InvalidValue {
            field: "conversion.on_malformed".to_string(),
            reason: format!("'{}' (expected skip or abort)", conversion.on_malformed),
        });
    }
    if conversion.regions.iter().any(|r| r.trim().is_empty()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "conversion.regions".to_string(),
            reason: "region names must not be empty".to_string(),
        });
    }
}

fn validate_output(config: &FlywireConfig, errors: &mut Vec<ConfigValidationError>) {
    let output = &config.output;
    if !matches!(output.json_format.to_lowercase().as_str(), "compact" | "pretty") {
        errors.push(ConfigValidationError::InvalidValue {
            field: "output.json_format".to_string(),
            reason: format!("'{}' (expected compact or pretty)", output.json_format),
        });
    }
    if output.file_suffix.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "output.file_suffix".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(collect_errors(&FlywireConfig::default()).is_empty());
    }

    #[test]
    fn test_duplicate_connection_columns() {
        let mut config = FlywireConfig::default();
        config.columns.target = config.columns.source.clone();

        let errors = collect_errors(&config);
        assert_eq!(
            errors,
            vec![ConfigValidationError::DuplicateColumn {
                column: "pre_root_id".to_string(),
                fields: ("columns.source".to_string(), "columns.target".to_string()),
            }]
        );
    }

    #[test]
    fn test_same_name_across_tables_is_allowed() {
        let mut config = FlywireConfig::default();
        config.columns.classification_id = config.columns.source.clone();
        assert!(collect_errors(&config).is_empty());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FlywireConfig::default();
        config.input.delimiter = String::new();
        config.columns.strength = " ".to_string();
        config.conversion.on_malformed = "ignore".to_string();
        config.conversion.regions.push(String::new());
        config.output.json_format = "yaml".to_string();
        config.output.file_suffix = String::new();

        assert_eq!(collect_errors(&config).len(), 6);

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("input.delimiter"));
        assert!(message.contains("output.json_format"));
    }
}
