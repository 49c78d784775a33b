//! # flywire
//!
//! Converts FlyWire connectome downloads (`connections.csv`,
//! `classification.csv`) into per-neuron JSON documents:
//!
//! ```json
//! {"720575940629970489": {"downstream": [720575940631406673], "strength": [12], "connection_type": ["ACH"]}}
//! ```
//!
//! ## Crates
//! - [`connectome`]: loading, conversion, JSON I/O, connectivity matrices
//! - [`config`]: `flywire_configuration.toml` with environment/CLI overrides
//! - [`observability`]: logging setup
//!
//! ## Example
//!
//! ```rust
//! use flywire::prelude::*;
//!
//! let rows = vec![
//!     ConnectionRecord::new(1, 2, 5, "ACh"),
//!     ConnectionRecord::new(1, 3, 2, "GABA"),
//!     ConnectionRecord::new(2, 1, 7, "ACh"),
//! ];
//! let (connectome, report) = Converter::new().convert(&rows);
//! assert_eq!(report.neurons, 2);
//!
//! let json = to_json_string(&connectome, JsonFormat::Compact).unwrap();
//! assert!(json.starts_with(r#"{"1":{"downstream":[2,3],"strength":[5,2]"#));
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use flywire_config as config;
pub use flywire_connectome as connectome;
pub use flywire_observability as observability;

mod settings;

pub use settings::ConversionSettings;

/// Commonly used items
pub mod prelude {
    pub use crate::settings::ConversionSettings;
    pub use flywire_config::{load_config_or_default, FlywireConfig};
    pub use flywire_connectome::{
        convert, downstream_classes, load_classification, load_connections, load_connectome,
        save_connectome, to_json_string, ClassificationColumns, ClassificationTable,
        ConnectionColumns, ConnectionRecord, ConnectivityMatrix, Connectome, ConnectomeError,
        ConversionReport, Converter, JsonFormat, LoadOptions, MalformedRowPolicy, NeuronId,
        NeuronProfile,
    };
}
