/*
 * Copyright 2025 Neuraville Inc.
 */

//! Which classes a converted region projects onto

use ahash::AHashSet;
use serde::Serialize;
use tracing::warn;

use crate::{ClassificationTable, Connectome, NeuronId};

/// Distinct downstream classes of a connectome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownstreamClasses {
    /// Class names in first-seen order
    pub classes: Vec<String>,
    /// Downstream neurons missing from the classification table, first-seen order
    pub unclassified: Vec<NeuronId>,
}

/// Collect the classes of every downstream neuron in `connectome`
pub fn downstream_classes(
    connectome: &Connectome,
    classification: &ClassificationTable,
) -> DownstreamClasses {
    let mut result = DownstreamClasses::default();
    let mut seen_classes: AHashSet<&str> = AHashSet::new();
    let mut seen_unclassified: AHashSet<NeuronId> = AHashSet::new();

    for (_, profile) in connectome.iter() {
        for &target in profile.downstream() {
            match classification.class_of(target) {
                Some(class) => {
                    if seen_classes.insert(class) {
                        result.classes.push(class.to_string());
                    }
                }
                None => {
                    if seen_unclassified.insert(target) {
                        result.unclassified.push(target);
                    }
                }
            }
        }
    }

    if !result.unclassified.is_empty() {
        warn!(
            "{} downstream neurons have no classification entry",
            result.unclassified.len()
        );
    }
    result
}
