// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # FlyWire Connectome
//!
//! Reshapes FlyWire connection tables (CSV) into per-neuron connectome documents.
//!
//! ## Pipeline
//! - **Load**: read `connections.csv` (and optionally `classification.csv`)
//! - **Convert**: group rows by presynaptic neuron into [`NeuronProfile`]s
//! - **Save**: write the [`Connectome`] as a JSON object keyed by neuron id
//!
//! ## Usage
//! ```ignore
//! use flywire_connectome::{load_connections, save_connectome, ConnectionColumns, Converter};
//!
//! let table = load_connections("Data/connections.csv", &ConnectionColumns::default(), &Default::default())?;
//! let (connectome, report) = Converter::new().convert(&table.records);
//! save_connectome(&connectome, "olfactory_connections.json", Default::default())?;
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use thiserror::Error;

mod classification;
mod converter;
mod downstream;
mod json_io;
mod loader;
mod matrix;
mod record;

pub use classification::*;
pub use converter::*;
pub use downstream::*;
pub use json_io::*;
pub use loader::*;
pub use matrix::*;
pub use record::*;

/// Connectome conversion errors
#[derive(Error, Debug)]
pub enum ConnectomeError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("Missing column '{column}' in {table} table header")]
    MissingColumn { table: &'static str, column: String },

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("Neuron {neuron}: downstream/strength/connection_type lengths differ ({downstream}/{strength}/{connection_type})")]
    InconsistentProfile {
        neuron: NeuronId,
        downstream: usize,
        strength: usize,
        connection_type: usize,
    },

    #[error("No neurons of class '{0}' in classification table")]
    UnknownClass(String),

    #[error("Connectivity matrix has no {0}")]
    EmptyMatrix(&'static str),
}

pub type Result<T> = std::result::Result<T, ConnectomeError>;
