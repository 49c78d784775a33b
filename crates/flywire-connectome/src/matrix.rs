/*
 * Copyright 2025 Neuraville Inc.
 */

//! Dense connectivity matrices between two converted regions

use std::fs::File;
use std::io::Write;
use std::path::Path;

use ndarray::Array2;
use tracing::{debug, info};

use crate::{Connectome, ConnectomeError, NeuronId, Result};

/// Synapse strengths from `rows` (upstream) to `cols` (downstream)
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityMatrix {
    rows: Vec<NeuronId>,
    cols: Vec<NeuronId>,
    values: Array2<f64>,
}

impl ConnectivityMatrix {
    /// Build the matrix from `upstream` onto the neurons of `downstream`
    ///
    /// Rows follow the key order of `upstream`, columns the key order of
    /// `downstream`. Targets that are not keys of `downstream` are ignored.
    /// A repeated (row, column) pair takes the strength of its last occurrence.
    pub fn between(upstream: &Connectome, downstream: &Connectome) -> Self {
        let rows: Vec<NeuronId> = upstream.neuron_ids().collect();
        let cols: Vec<NeuronId> = downstream.neuron_ids().collect();
        let mut values = Array2::<f64>::zeros((rows.len(), cols.len()));

        let mut outside = 0usize;
        for (i, (_, profile)) in upstream.iter().enumerate() {
            for (target, strength, _) in profile.connections() {
                match downstream.index_of(target) {
                    Some(j) => values[[i, j]] = f64::from(strength),
                    None => outside += 1,
                }
            }
        }
        debug!(
            rows = rows.len(),
            cols = cols.len(),
            outside,
            "Built connectivity matrix"
        );

        Self { rows, cols, values }
    }

    /// Matrix of a region onto itself
    pub fn within(region: &Connectome) -> Self {
        Self::between(region, region)
    }

    /// Scale so the strongest connection is 1.0; an all-zero matrix is unchanged
    pub fn normalize(&mut self) {
        let max = self.max();
        if max > 0.0 {
            self.values.mapv_inplace(|v| v / max);
        }
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn get(&self, row: NeuronId, col: NeuronId) -> Option<f64> {
        let i = self.rows.iter().position(|&id| id == row)?;
        let j = self.cols.iter().position(|&id| id == col)?;
        Some(self.values[[i, j]])
    }

    pub fn rows(&self) -> &[NeuronId] {
        &self.rows
    }

    pub fn cols(&self) -> &[NeuronId] {
        &self.cols
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of non-zero cells
    pub fn nonzero(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }

    /// Write as CSV: header `upstream,<col ids...>`, then one line per row neuron
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        if self.rows.is_empty() {
            return Err(ConnectomeError::EmptyMatrix("rows"));
        }
        if self.cols.is_empty() {
            return Err(ConnectomeError::EmptyMatrix("columns"));
        }

        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(self.cols.len() + 1);
        header.push("upstream".to_string());
        header.extend(self.cols.iter().map(NeuronId::to_string));
        csv_writer.write_record(&header)?;

        for (i, row_id) in self.rows.iter().enumerate() {
            let mut record = Vec::with_capacity(self.cols.len() + 1);
            record.push(row_id.to_string());
            record.extend(self.values.row(i).iter().map(f64::to_string));
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write as CSV to `path`
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.write_csv(File::create(path)?)?;
        info!(
            rows = self.rows.len(),
            cols = self.cols.len(),
            nonzero = self.nonzero(),
            "Saved connectivity matrix to {}",
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{convert, ConnectionRecord};

    fn region_a() -> Connectome {
        convert(&[
            ConnectionRecord::new(1, 2, 4, "ACH"),
            ConnectionRecord::new(1, 10, 6, "ACH"),
            ConnectionRecord::new(2, 1, 8, "GABA"),
            ConnectionRecord::new(2, 11, 2, "GABA"),
            ConnectionRecord::new(2, 99, 50, "GABA"),
        ])
    }

    fn region_b() -> Connectome {
        convert(&[
            ConnectionRecord::new(10, 1, 3, "GLUT"),
            ConnectionRecord::new(11, 2, 1, "GLUT"),
        ])
    }

    #[test]
    fn test_within_region() {
        let matrix = ConnectivityMatrix::within(&region_a());
        assert_eq!(matrix.rows(), &[1, 2]);
        assert_eq!(matrix.cols(), &[1, 2]);
        assert_eq!(matrix.get(1, 2), Some(4.0));
        assert_eq!(matrix.get(2, 1), Some(8.0));
        assert_eq!(matrix.get(1, 1), Some(0.0));
        assert_eq!(matrix.nonzero(), 2);
    }

    #[test]
    fn test_between_regions_both_directions() {
        let forward = ConnectivityMatrix::between(&region_a(), &region_b());
        assert_eq!(forward.values().dim(), (2, 2));
        assert_eq!(forward.get(1, 10), Some(6.0));
        assert_eq!(forward.get(2, 11), Some(2.0));

        let reverse = ConnectivityMatrix::between(&region_b(), &region_a());
        assert_eq!(reverse.get(10, 1), Some(3.0));
        assert_eq!(reverse.get(11, 2), Some(1.0));
    }

    #[test]
    fn test_repeated_pair_last_wins() {
        let region = convert(&[
            ConnectionRecord::new(1, 2, 4, "ACH"),
            ConnectionRecord::new(1, 2, 9, "ACH"),
            ConnectionRecord::new(2, 1, 1, "ACH"),
        ]);
        let matrix = ConnectivityMatrix::within(&region);
        assert_eq!(matrix.get(1, 2), Some(9.0));
    }

    #[test]
    fn test_normalize() {
        let mut matrix = ConnectivityMatrix::within(&region_a());
        matrix.normalize();
        assert_eq!(matrix.max(), 1.0);
        assert_eq!(matrix.get(1, 2), Some(0.5));

        let mut zeros = ConnectivityMatrix::between(&region_b(), &region_b());
        zeros.normalize();
        assert_eq!(zeros.max(), 0.0);
    }

    #[test]
    fn test_write_csv() {
        let matrix = ConnectivityMatrix::within(&region_a());
        let mut buffer = Vec::new();
        matrix.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "upstream,1,2\n1,0,4\n2,8,0\n");
    }

    #[test]
    fn test_write_csv_empty_matrix() {
        let matrix = ConnectivityMatrix::within(&Connectome::new());
        assert!(matches!(
            matrix.write_csv(Vec::new()),
            Err(ConnectomeError::EmptyMatrix("rows"))
        ));
    }
}
