/*
 * Copyright 2025 Neuraville Inc.
 */

//! Reading and writing connectome JSON documents
//!
//! ```text
//! {"<neuron_id>": {"downstream": [..], "strength": [..], "connection_type": [..]}, ...}
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Connectome, ConnectomeError, Result};

/// Text layout of the written JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonFormat {
    #[default]
    Compact,
    Pretty,
}

impl std::str::FromStr for JsonFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown JSON format '{}' (expected compact or pretty)", other)),
        }
    }
}

/// Serialize to a JSON string
pub fn to_json_string(connectome: &Connectome, format: JsonFormat) -> Result<String> {
    let text = match format {
        JsonFormat::Compact => serde_json::to_string(connectome)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(connectome)?,
    };
    Ok(text)
}

/// Parse a JSON document, rejecting profiles whose sequences differ in length
pub fn from_json_str(text: &str) -> Result<Connectome> {
    let connectome: Connectome = serde_json::from_str(text)?;
    check_alignment(&connectome)?;
    Ok(connectome)
}

/// Save a connectome to `path`
pub fn save_connectome<P: AsRef<Path>>(
    connectome: &Connectome,
    path: P,
    format: JsonFormat,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    match format {
        JsonFormat::Compact => serde_json::to_writer(&mut writer, connectome)?,
        JsonFormat::Pretty => serde_json::to_writer_pretty(&mut writer, connectome)?,
    }
    writer.flush()?;

    info!(
        neurons = connectome.len(),
        "Saved connectome to {}",
        path.display()
    );
    Ok(())
}

/// Load a connectome previously written by [`save_connectome`]
pub fn load_connectome<P: AsRef<Path>>(path: P) -> Result<Connectome> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let connectome: Connectome = serde_json::from_reader(reader)?;
    check_alignment(&connectome)?;

    info!(
        neurons = connectome.len(),
        "Loaded connectome from {}",
        path.display()
    );
    Ok(connectome)
}

fn check_alignment(connectome: &Connectome) -> Result<()> {
    for (neuron, profile) in connectome.iter() {
        if !profile.is_aligned() {
            let (downstream, strength, connection_type) = profile.lengths();
            return Err(ConnectomeError::InconsistentProfile {
                neuron,
                downstream,
                strength,
                connection_type,
            });
        }
    }
    Ok(())
}
