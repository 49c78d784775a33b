/*
 * Copyright 2025 Neuraville Inc.
 */

//! Neuron classification table (`classification.csv`)

use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::loader::{field, parse_neuron_id, read_rows};
use crate::{
    ClassificationColumns, ConnectomeError, LoadOptions, NeuronClassification, NeuronId, Result,
    SkippedRow,
};

/// `root_id -> class` lookup in table order
#[derive(Debug, Clone, Default)]
pub struct ClassificationTable {
    classes: IndexMap<NeuronId, String>,
    skipped: Vec<SkippedRow>,
}

impl ClassificationTable {
    /// Build from already parsed rows; a repeated root id keeps its first class
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = NeuronClassification>,
    {
        let mut classes = IndexMap::new();
        for row in rows {
            classes.entry(row.root_id).or_insert(row.class);
        }
        Self {
            classes,
            skipped: Vec::new(),
        }
    }

    /// Class of `neuron`, if it is classified
    pub fn class_of(&self, neuron: NeuronId) -> Option<&str> {
        self.classes.get(&neuron).map(String::as_str)
    }

    /// All neurons of `class`, in table order
    pub fn neurons_of_class(&self, class: &str) -> Vec<NeuronId> {
        let neurons: Vec<NeuronId> = self
            .classes
            .iter()
            .filter(|(_, c)| c.as_str() == class)
            .map(|(&id, _)| id)
            .collect();
        debug!(class, count = neurons.len(), "Class lookup");
        neurons
    }

    /// Like [`Self::neurons_of_class`] but an unknown class is an error
    pub fn require_class(&self, class: &str) -> Result<Vec<NeuronId>> {
        let neurons = self.neurons_of_class(class);
        if neurons.is_empty() {
            return Err(ConnectomeError::UnknownClass(class.to_string()));
        }
        Ok(neurons)
    }

    /// Distinct class names in first-seen order
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for class in self.classes.values() {
            if !names.contains(&class.as_str()) {
                names.push(class);
            }
        }
        names
    }

    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Load `classification.csv` from disk
pub fn load_classification<P: AsRef<Path>>(
    path: P,
    columns: &ClassificationColumns,
    options: &LoadOptions,
) -> Result<ClassificationTable> {
    let path = path.as_ref();
    info!("Loading classification from {}", path.display());
    let file = File::open(path)?;
    read_classification(file, columns, options)
}

/// Parse a classification table from any reader
///
/// Rows with an empty class are malformed; FlyWire leaves the class blank for
/// many neurons and those cannot be selected by class anyway.
pub fn read_classification<R: Read>(
    reader: R,
    columns: &ClassificationColumns,
    options: &LoadOptions,
) -> Result<ClassificationTable> {
    let wanted = [columns.root_id.as_str(), columns.class.as_str()];
    let (rows, skipped) = read_rows(reader, "classification", &wanted, options, |row, idx| {
        let root_id = parse_neuron_id(row, idx[0], &columns.root_id)?;
        match field(row, idx[1]) {
            "" => Err(format!("empty {}", columns.class)),
            class => Ok(NeuronClassification {
                root_id,
                class: class.to_string(),
            }),
        }
    })?;

    let mut table = ClassificationTable::from_rows(rows);
    table.skipped = skipped;
    Ok(table)
}
