//! Maps [`FlywireConfig`] onto the loader and writer settings of `flywire-connectome`

use anyhow::{anyhow, Result};
use flywire_config::FlywireConfig;
use flywire_connectome::{ClassificationColumns, ConnectionColumns, JsonFormat, LoadOptions};

/// Everything the conversion commands need from the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSettings {
    pub connection_columns: ConnectionColumns,
    pub classification_columns: ClassificationColumns,
    pub load_options: LoadOptions,
    pub json_format: JsonFormat,
}

impl ConversionSettings {
    pub fn from_config(config: &FlywireConfig) -> Result<Self> {
        let columns = &config.columns;
        let delimiter = match config.input.delimiter.as_bytes() {
            [byte] => *byte,
            _ => {
                return Err(anyhow!(
                    "input.delimiter '{}' must be a single ASCII character",
                    config.input.delimiter
                ))
            }
        };

        Ok(Self {
            connection_columns: ConnectionColumns {
                source: columns.source.clone(),
                target: columns.target.clone(),
                strength: columns.strength.clone(),
                connection_type: columns.connection_type.clone(),
            },
            classification_columns: ClassificationColumns {
                root_id: columns.classification_id.clone(),
                class: columns.classification_class.clone(),
            },
            load_options: LoadOptions {
                delimiter,
                on_malformed: config.conversion.on_malformed.parse().map_err(|e| anyhow!("{}", e))?,
                missing_type_label: config.conversion.missing_type_label.clone(),
            },
            json_format: config.output.json_format.parse().map_err(|e| anyhow!("{}", e))?,
        })
    }
}
