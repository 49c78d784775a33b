/*
 * Copyright 2025 Neuraville Inc.
 */

//! CSV loading for FlyWire connection tables
//!
//! Columns are located by header name, so column order and extra columns in
//! the export do not matter. Rows that cannot be turned into a record are
//! handled according to [`MalformedRowPolicy`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{ConnectionRecord, ConnectomeError, NeuronId, Result};

/// Individually logged skips before switching to a summary line
const MAX_LOGGED_SKIPS: usize = 5;

/// What to do with a row that cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRowPolicy {
    /// Record the row in [`SkippedRow`]s and keep going
    #[default]
    Skip,
    /// Fail the whole load at the first bad row
    Abort,
}

impl std::str::FromStr for MalformedRowPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown malformed-row policy '{}' (expected skip or abort)", other)),
        }
    }
}

/// Header names of the connection table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionColumns {
    pub source: String,
    pub target: String,
    pub strength: String,
    pub connection_type: String,
}

impl Default for ConnectionColumns {
    fn default() -> Self {
        Self {
            source: "pre_root_id".to_string(),
            target: "post_root_id".to_string(),
            strength: "syn_count".to_string(),
            connection_type: "nt_type".to_string(),
        }
    }
}

/// Header names of the classification table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationColumns {
    pub root_id: String,
    pub class: String,
}

impl Default for ClassificationColumns {
    fn default() -> Self {
        Self {
            root_id: "root_id".to_string(),
            class: "class".to_string(),
        }
    }
}

/// Reader settings shared by both tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub on_malformed: MalformedRowPolicy,
    /// Substituted for an empty connection type instead of rejecting the row
    pub missing_type_label: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            on_malformed: MalformedRowPolicy::Skip,
            missing_type_label: None,
        }
    }
}

/// A row that was left out of the loaded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the input file (header is line 1)
    pub line: u64,
    pub reason: String,
}

/// Parsed connection table
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    pub records: Vec<ConnectionRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Load `connections.csv` from disk
pub fn load_connections<P: AsRef<Path>>(
    path: P,
    columns: &ConnectionColumns,
    options: &LoadOptions,
) -> Result<ConnectionTable> {
    let path = path.as_ref();
    info!("Loading connections from {}", path.display());
    let file = File::open(path)?;
    read_connections(file, columns, options)
}

/// Parse a connection table from any reader
pub fn read_connections<R: Read>(
    reader: R,
    columns: &ConnectionColumns,
    options: &LoadOptions,
) -> Result<ConnectionTable> {
    let wanted = [
        columns.source.as_str(),
        columns.target.as_str(),
        columns.strength.as_str(),
        columns.connection_type.as_str(),
    ];

    let (records, skipped) = read_rows(reader, "connection", &wanted, options, |row, idx| {
        let source_id = parse_neuron_id(row, idx[0], &columns.source)?;
        let target_id = parse_neuron_id(row, idx[1], &columns.target)?;
        let strength = parse_strength(row, idx[2], &columns.strength)?;
        let connection_type = match field(row, idx[3]) {
            "" => options
                .missing_type_label
                .clone()
                .ok_or_else(|| format!("empty {}", columns.connection_type))?,
            label => label.to_string(),
        };
        Ok(ConnectionRecord {
            source_id,
            target_id,
            strength,
            connection_type,
        })
    })?;

    Ok(ConnectionTable { records, skipped })
}

/// Shared row loop: header lookup, field-count check, policy handling, skip logging
pub(crate) fn read_rows<R, T, F>(
    reader: R,
    table: &'static str,
    wanted: &[&str],
    options: &LoadOptions,
    mut parse: F,
) -> Result<(Vec<T>, Vec<SkippedRow>)>
where
    R: Read,
    F: FnMut(&StringRecord, &[usize]) -> std::result::Result<T, String>,
{
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        debug!(table, "Input has no header row; treating as empty table");
        return Ok((Vec::new(), Vec::new()));
    }
    let indices = wanted
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == *name)
                .ok_or_else(|| ConnectomeError::MissingColumn {
                    table,
                    column: name.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(table, ?indices, "Resolved {} columns", wanted.len());

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for result in csv_reader.records() {
        let (line, outcome) = match result {
            Ok(row) => {
                let line = row.position().map(|p| p.line()).unwrap_or(0);
                let outcome = if row.len() != headers.len() {
                    Err(format!("expected {} fields, found {}", headers.len(), row.len()))
                } else {
                    parse(&row, &indices)
                };
                (line, outcome)
            }
            Err(e) => match e.kind() {
                csv::ErrorKind::Utf8 { pos, err } => (
                    pos.as_ref().map(|p| p.line()).unwrap_or(0),
                    Err(format!("invalid UTF-8: {}", err)),
                ),
                _ => return Err(e.into()),
            },
        };

        match outcome {
            Ok(row) => rows.push(row),
            Err(reason) => {
                if options.on_malformed == MalformedRowPolicy::Abort {
                    return Err(ConnectomeError::MalformedRow { line, reason });
                }
                if skipped.len() < MAX_LOGGED_SKIPS {
                    warn!(table, line, "Skipping malformed row: {}", reason);
                }
                skipped.push(SkippedRow { line, reason });
            }
        }
    }

    if skipped.len() > MAX_LOGGED_SKIPS {
        warn!(
            table,
            "Skipped {} malformed rows ({} not shown individually)",
            skipped.len(),
            skipped.len() - MAX_LOGGED_SKIPS
        );
    }
    info!(table, rows = rows.len(), skipped = skipped.len(), "Table loaded");

    Ok((rows, skipped))
}

pub(crate) fn field(row: &StringRecord, index: usize) -> &str {
    row.get(index).unwrap_or("")
}

pub(crate) fn parse_neuron_id(
    row: &StringRecord,
    index: usize,
    column: &str,
) -> std::result::Result<NeuronId, String> {
    match field(row, index) {
        "" => Err(format!("empty {}", column)),
        raw => raw
            .parse::<NeuronId>()
            .map_err(|_| format!("{} '{}' is not a neuron id", column, raw)),
    }
}

fn parse_strength(
    row: &StringRecord,
    index: usize,
    column: &str,
) -> std::result::Result<u32, String> {
    match field(row, index) {
        "" => Err(format!("empty {}", column)),
        raw if raw.starts_with('-') => Err(format!("{} '{}' is negative", column, raw)),
        raw => raw
            .parse::<u32>()
            .map_err(|_| format!("{} '{}' is not a synapse count", column, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "pre_root_id,post_root_id,neuropil,syn_count,nt_type\n";

    fn load(body: &str, options: &LoadOptions) -> Result<ConnectionTable> {
        let csv = format!("{}{}", HEADER, body);
        read_connections(csv.as_bytes(), &ConnectionColumns::default(), options)
    }

    #[test]
    fn test_reads_rows_by_header_name() {
        let table = load(
            "720575940629970489,720575940631406673,AL_L,5,ACH\n1,3,AL_R,2,GABA\n",
            &LoadOptions::default(),
        )
        .unwrap();

        assert!(table.skipped.is_empty());
        assert_eq!(
            table.records,
            vec![
                ConnectionRecord::new(720575940629970489, 720575940631406673, 5, "ACH"),
                ConnectionRecord::new(1, 3, 2, "GABA"),
            ]
        );
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = load("", &LoadOptions::default()).unwrap();
        assert!(table.records.is_empty());
        assert!(table.skipped.is_empty());
    }

    #[test]
    fn test_zero_byte_input_is_empty_table() {
        let table = read_connections(&b""[..], &ConnectionColumns::default(), &LoadOptions::default()).unwrap();
        assert!(table.records.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let csv = "pre_root_id,post_root_id,nt_type\n1,2,ACH\n";
        let result = read_connections(csv.as_bytes(), &ConnectionColumns::default(), &LoadOptions::default());
        assert!(matches!(
            result,
            Err(ConnectomeError::MissingColumn { column, .. }) if column == "syn_count"
        ));
    }

    #[test]
    fn test_skips_malformed_rows_with_line_numbers() {
        let mut csv = format!(
            "{}{}",
            HEADER,
            "1,2,AL_L,5,ACH\n1,x,AL_L,5,ACH\n1,3,AL_L,,GABA\n1,4,AL_L,-2,GABA\n1,5,AL_L,3,\n2,1,AL_L,7\n"
        )
        .into_bytes();
        csv.extend_from_slice(b"2,9,AL_L,\xff\xfe,ACH\n2,1,AL_L,7,ACH\n");

        let table = read_connections(&csv[..], &ConnectionColumns::default(), &LoadOptions::default()).unwrap();

        assert_eq!(
            table.records,
            vec![
                ConnectionRecord::new(1, 2, 5, "ACH"),
                ConnectionRecord::new(2, 1, 7, "ACH"),
            ]
        );
        let lines: Vec<u64> = table.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6, 7, 8]);
        assert!(table.skipped[2].reason.contains("negative"));
        assert!(table.skipped[4].reason.contains("fields"));
        assert!(table.skipped[5].reason.contains("UTF-8"));
    }

    #[test]
    fn test_abort_policy_fails_on_first_bad_row() {
        let options = LoadOptions {
            on_malformed: MalformedRowPolicy::Abort,
            ..LoadOptions::default()
        };
        let result = load("1,2,AL_L,5,ACH\n1,3,AL_L,many,GABA\n", &options);
        assert!(matches!(result, Err(ConnectomeError::MalformedRow { line: 3, .. })));
    }

    #[test]
    fn test_missing_type_label_fills_empty_type() {
        let options = LoadOptions {
            missing_type_label: Some("UNKNOWN".to_string()),
            ..LoadOptions::default()
        };
        let table = load("1,5,AL_L,3,\n", &options).unwrap();
        assert_eq!(table.records, vec![ConnectionRecord::new(1, 5, 3, "UNKNOWN")]);
    }

    #[test]
    fn test_custom_columns_and_delimiter() {
        let columns = ConnectionColumns {
            source: "from".to_string(),
            target: "to".to_string(),
            strength: "weight".to_string(),
            connection_type: "nt".to_string(),
        };
        let options = LoadOptions {
            delimiter: b'\t',
            ..LoadOptions::default()
        };
        let tsv = "nt\tweight\tto\tfrom\nDA\t9\t20\t10\n";
        let table = read_connections(tsv.as_bytes(), &columns, &options).unwrap();
        assert_eq!(table.records, vec![ConnectionRecord::new(10, 20, 9, "DA")]);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Skip".parse::<MalformedRowPolicy>().unwrap(), MalformedRowPolicy::Skip);
        assert_eq!("abort".parse::<MalformedRowPolicy>().unwrap(), MalformedRowPolicy::Abort);
        assert!("ignore".parse::<MalformedRowPolicy>().is_err());
    }
}
