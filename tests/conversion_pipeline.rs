// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests: CSV files on disk -> converted JSON -> downstream classes and matrices.

use std::fs;
use std::path::Path;

use flywire::prelude::*;
use serde_json::json;
use tempfile::tempdir;

const CONNECTIONS: &str = "\
pre_root_id,post_root_id,neuropil,syn_count,nt_type
101,201,AL_R,12,ACH
101,202,AL_R,7,ACH
102,201,LH_R,5,GABA
201,101,LH_R,3,GLUT
101,201,AL_L,4,ACH
301,101,LH_R,9,DA
102,bad,LH_R,5,GABA
202,102,LH_R,,GABA
";

const CLASSIFICATION: &str = "\
root_id,flow,super_class,class,sub_class
101,intrinsic,central,ALPN,uniglomerular
102,intrinsic,central,ALPN,multiglomerular
201,intrinsic,central,LHCENT,
202,intrinsic,central,LHLN,
301,afferent,sensory,olfactory,
";

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn sample_records() -> Vec<ConnectionRecord> {
    vec![
        ConnectionRecord::new(1, 2, 5, "ACh"),
        ConnectionRecord::new(1, 3, 2, "GABA"),
        ConnectionRecord::new(2, 1, 7, "ACh"),
    ]
}

#[test]
fn test_reference_example() {
    let connectome = convert(&sample_records());
    let text = to_json_string(&connectome, JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(
        value,
        json!({
            "1": {"downstream": [2, 3], "strength": [5, 2], "connection_type": ["ACh", "GABA"]},
            "2": {"downstream": [1], "strength": [7], "connection_type": ["ACh"]}
        })
    );
}

#[test]
fn test_empty_input_is_empty_object() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "connections.csv", "pre_root_id,post_root_id,syn_count,nt_type\n");

    let table = load_connections(&path, &ConnectionColumns::default(), &LoadOptions::default()).unwrap();
    let connectome = convert(&table.records);
    assert_eq!(to_json_string(&connectome, JsonFormat::Compact).unwrap(), "{}");
}

#[test]
fn test_every_row_lands_at_its_index() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "connections.csv", CONNECTIONS);
    let table = load_connections(&path, &ConnectionColumns::default(), &LoadOptions::default()).unwrap();
    let connectome = convert(&table.records);

    // Arrays of every key have equal length
    for (_, profile) in connectome.iter() {
        assert_eq!(profile.downstream().len(), profile.strength().len());
        assert_eq!(profile.strength().len(), profile.connection_type().len());
    }

    // Each row appears at the next free index of its source, in row order
    let mut cursor: std::collections::HashMap<NeuronId, usize> = Default::default();
    for record in &table.records {
        let index = cursor.entry(record.source_id).or_insert(0);
        let profile = connectome.get(record.source_id).unwrap();
        assert_eq!(profile.downstream()[*index], record.target_id);
        assert_eq!(profile.strength()[*index], record.strength);
        assert_eq!(profile.connection_type()[*index], record.connection_type);
        *index += 1;
    }

    // No rows, no key
    assert!(!connectome.contains(202));
    assert_eq!(table.skipped.len(), 2);
}

#[test]
fn test_conversion_is_deterministic() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "connections.csv", CONNECTIONS);
    let load = || load_connections(&path, &ConnectionColumns::default(), &LoadOptions::default()).unwrap();

    let first = to_json_string(&convert(&load().records), JsonFormat::Compact).unwrap();
    let second = to_json_string(&convert(&load().records), JsonFormat::Compact).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_region_pipeline() {
    let dir = tempdir().unwrap();
    let connections = write(dir.path(), "connections.csv", CONNECTIONS);
    let classification_path = write(dir.path(), "classification.csv", CLASSIFICATION);

    let table = load_connections(&connections, &ConnectionColumns::default(), &LoadOptions::default()).unwrap();
    let classification =
        load_classification(&classification_path, &ClassificationColumns::default(), &LoadOptions::default())
            .unwrap();

    // ALPN region
    let alpn = classification.neurons_of_class("ALPN");
    assert_eq!(alpn, vec![101, 102]);
    let (alpn_region, report) = Converter::new().with_filter(alpn).convert(&table.records);
    assert_eq!(report.rows_grouped, 4);
    assert_eq!(report.rows_filtered, 2);

    let alpn_path = dir.path().join("ALPN_connections.json");
    save_connectome(&alpn_region, &alpn_path, JsonFormat::Pretty).unwrap();
    let reloaded = load_connectome(&alpn_path).unwrap();
    assert_eq!(reloaded, alpn_region);

    let profile = reloaded.get(101).unwrap();
    assert_eq!(profile.downstream(), &[201, 202, 201]);
    assert_eq!(profile.strength(), &[12, 7, 4]);

    // Downstream classes of the ALPN region
    let downstream = downstream_classes(&reloaded, &classification);
    assert_eq!(downstream.classes, vec!["LHCENT", "LHLN"]);
    assert!(downstream.unclassified.is_empty());

    // LHCENT region and both matrix directions
    let lhcent = classification.neurons_of_class("LHCENT");
    let (lhcent_region, _) = Converter::new().with_filter(lhcent).convert(&table.records);

    let forward = ConnectivityMatrix::between(&reloaded, &lhcent_region);
    assert_eq!(forward.rows(), &[101, 102]);
    assert_eq!(forward.cols(), &[201]);
    // 101 -> 201 appears twice; the later row wins
    assert_eq!(forward.get(101, 201), Some(4.0));
    assert_eq!(forward.get(102, 201), Some(5.0));

    let reverse = ConnectivityMatrix::between(&lhcent_region, &reloaded);
    assert_eq!(reverse.get(201, 101), Some(3.0));

    let matrix_path = dir.path().join("alpn_lhcent.csv");
    forward.save_csv(&matrix_path).unwrap();
    assert_eq!(
        fs::read_to_string(&matrix_path).unwrap(),
        "upstream,201\n101,4\n102,5\n"
    );
}

#[test]
fn test_abort_policy_surfaces_line() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "connections.csv", CONNECTIONS);
    let options = LoadOptions {
        on_malformed: MalformedRowPolicy::Abort,
        ..LoadOptions::default()
    };

    let result = load_connections(&path, &ConnectionColumns::default(), &options);
    assert!(matches!(result, Err(ConnectomeError::MalformedRow { line: 8, .. })));
}

#[test]
fn test_missing_input_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = load_connections(
        dir.path().join("missing.csv"),
        &ConnectionColumns::default(),
        &LoadOptions::default(),
    );
    assert!(matches!(result, Err(ConnectomeError::Io(_))));
}

#[test]
fn test_settings_from_config_file() {
    let dir = tempdir().unwrap();
    let config_path = write(
        dir.path(),
        "flywire_configuration.toml",
        "[columns]\nsource = \"from\"\n\n[conversion]\non_malformed = \"abort\"\n\n[output]\njson_format = \"pretty\"\n",
    );

    let config = flywire::config::load_config(Some(&config_path), None).unwrap();
    let settings = ConversionSettings::from_config(&config).unwrap();
    assert_eq!(settings.connection_columns.source, "from");
    assert_eq!(settings.load_options.on_malformed, MalformedRowPolicy::Abort);
    assert_eq!(settings.json_format, JsonFormat::Pretty);
}
