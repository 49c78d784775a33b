/*
 * Copyright 2025 Neuraville Inc.
 */

//! Input row types

use serde::{Deserialize, Serialize};

/// FlyWire root id (18-digit integers in the public dataset)
pub type NeuronId = u64;

/// One synaptic connection row from `connections.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Presynaptic neuron (`pre_root_id`)
    pub source_id: NeuronId,

    /// Postsynaptic neuron (`post_root_id`)
    pub target_id: NeuronId,

    /// Synapse count (`syn_count`)
    pub strength: u32,

    /// Neurotransmitter label (`nt_type`), e.g. "ACH", "GABA"
    pub connection_type: String,
}

impl ConnectionRecord {
    pub fn new(
        source_id: NeuronId,
        target_id: NeuronId,
        strength: u32,
        connection_type: impl Into<String>,
    ) -> Self {
        Self {
            source_id,
            target_id,
            strength,
            connection_type: connection_type.into(),
        }
    }
}

/// One row from `classification.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronClassification {
    pub root_id: NeuronId,
    pub class: String,
}
