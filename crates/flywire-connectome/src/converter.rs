/*
 * Copyright 2025 Neuraville Inc.
 */

//! Grouping of connection rows into per-neuron profiles

use ahash::AHashSet;
use indexmap::IndexMap;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ConnectionRecord, ConnectionTable, NeuronId};

/// Downstream connections of one presynaptic neuron
///
/// The three sequences are index-aligned: entry `i` of each describes the
/// same connection. Fields are private so that [`NeuronProfile::push`] is the
/// only way to grow them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronProfile {
    downstream: Vec<NeuronId>,
    strength: Vec<u32>,
    connection_type: Vec<String>,
}

impl NeuronProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one connection to all three sequences
    pub fn push(&mut self, target_id: NeuronId, strength: u32, connection_type: impl Into<String>) {
        self.downstream.push(target_id);
        self.strength.push(strength);
        self.connection_type.push(connection_type.into());
    }

    pub fn downstream(&self) -> &[NeuronId] {
        &self.downstream
    }

    pub fn strength(&self) -> &[u32] {
        &self.strength
    }

    pub fn connection_type(&self) -> &[String] {
        &self.connection_type
    }

    pub fn len(&self) -> usize {
        self.downstream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.downstream.is_empty()
    }

    /// `(target, strength, type)` triples in row order
    pub fn connections(&self) -> impl Iterator<Item = (NeuronId, u32, &str)> + '_ {
        self.downstream
            .iter()
            .zip(&self.strength)
            .zip(&self.connection_type)
            .map(|((&target, &strength), kind)| (target, strength, kind.as_str()))
    }

    /// True when the three sequences have equal length
    pub(crate) fn is_aligned(&self) -> bool {
        self.downstream.len() == self.strength.len()
            && self.strength.len() == self.connection_type.len()
    }

    pub(crate) fn lengths(&self) -> (usize, usize, usize) {
        (
            self.downstream.len(),
            self.strength.len(),
            self.connection_type.len(),
        )
    }
}

/// Per-neuron connectome, keyed by presynaptic neuron id
///
/// Keys keep first-seen order so the same input always serializes to the
/// same JSON text. `serde_json` writes the integer keys as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Connectome {
    neurons: IndexMap<NeuronId, NeuronProfile>,
}

impl Connectome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile for `neuron`, creating an empty one on first sight
    pub fn entry(&mut self, neuron: NeuronId) -> &mut NeuronProfile {
        self.neurons.entry(neuron).or_default()
    }

    pub fn get(&self, neuron: NeuronId) -> Option<&NeuronProfile> {
        self.neurons.get(&neuron)
    }

    pub fn contains(&self, neuron: NeuronId) -> bool {
        self.neurons.contains_key(&neuron)
    }

    /// Position of `neuron` in key order
    pub fn index_of(&self, neuron: NeuronId) -> Option<usize> {
        self.neurons.get_index_of(&neuron)
    }

    pub fn neuron_ids(&self) -> impl Iterator<Item = NeuronId> + '_ {
        self.neurons.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NeuronId, &NeuronProfile)> + '_ {
        self.neurons.iter().map(|(&id, profile)| (id, profile))
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Total number of connections across all neurons
    pub fn connection_count(&self) -> usize {
        self.neurons.values().map(NeuronProfile::len).sum()
    }
}

/// Counters from one conversion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Rows handed to the converter
    pub rows_read: usize,
    /// Rows appended to a profile
    pub rows_grouped: usize,
    /// Rows dropped by the neuron filter
    pub rows_filtered: usize,
    /// Malformed rows left out while loading the table
    pub rows_skipped: usize,
    /// Distinct presynaptic neurons in the output
    pub neurons: usize,
}

/// Single-pass row grouper
///
/// Without a filter every row is grouped. With a filter only rows whose
/// source neuron is in the set are grouped; neurons of the set that have no
/// rows do not get an entry.
pub struct Converter {
    filter: Option<AHashSet<NeuronId>>,
    progress: ProgressBar,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    pub fn new() -> Self {
        Self {
            filter: None,
            progress: ProgressBar::hidden(),
        }
    }

    /// Restrict grouping to rows whose source neuron is in `neurons`
    pub fn with_filter<I>(mut self, neurons: I) -> Self
    where
        I: IntoIterator<Item = NeuronId>,
    {
        self.filter = Some(neurons.into_iter().collect());
        self
    }

    /// Advance `progress` once per row
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Group a loaded table; the report also carries the table's skipped-row count
    pub fn convert_table(&self, table: &ConnectionTable) -> (Connectome, ConversionReport) {
        let (connectome, mut report) = self.convert(&table.records);
        report.rows_skipped = table.skipped.len();
        (connectome, report)
    }

    pub fn convert(&self, records: &[ConnectionRecord]) -> (Connectome, ConversionReport) {
        let mut connectome = Connectome::new();
        let mut report = ConversionReport {
            rows_read: records.len(),
            ..ConversionReport::default()
        };

        self.progress.set_length(records.len() as u64);
        for record in records {
            let wanted = self
                .filter
                .as_ref()
                .map_or(true, |neurons| neurons.contains(&record.source_id));

            if wanted {
                connectome.entry(record.source_id).push(
                    record.target_id,
                    record.strength,
                    record.connection_type.as_str(),
                );
                report.rows_grouped += 1;
            } else {
                report.rows_filtered += 1;
            }
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        report.neurons = connectome.len();
        debug!(?report, "Conversion pass finished");
        info!(
            "Grouped {} connections into {} neurons",
            report.rows_grouped, report.neurons
        );

        (connectome, report)
    }
}

/// Group `records` without a filter
pub fn convert(records: &[ConnectionRecord]) -> Connectome {
    Converter::new().convert(records).0
}
