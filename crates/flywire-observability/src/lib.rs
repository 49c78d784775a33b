// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # flywire-observability
//!
//! Logging setup shared by the FlyWire crates, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: JSON log file per run (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "flywire",
    "flywire-connectome",
    "flywire-config",
    "flywire-observability",
];
