// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
FlyWire Connectome Converter

Turns the FlyWire `connections.csv` / `classification.csv` downloads
(https://codex.flywire.ai/api/download) into per-neuron JSON documents.

Usage:
  cargo run --bin flywire -- convert --output all_connections.json
  cargo run --bin flywire -- convert --class ALPN --output ALPN_connections.json
  cargo run --bin flywire -- regions --region ALPN --region LHCENT
  cargo run --bin flywire -- downstream --input ALPN_connections.json
  cargo run --bin flywire -- matrix --upstream ALPN_connections.json --downstream LHCENT_connections.json --output alpn_lhcent.csv
*/

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use flywire::config::{load_config_or_default, FlywireConfig};
use flywire::connectome::{
    downstream_classes, load_classification, load_connections, load_connectome, save_connectome,
    ClassificationTable, ConnectionTable, ConnectivityMatrix, ConversionReport, Converter,
};
use flywire::observability::{debug_flags_help, init_logging, CrateDebugFlags};
use flywire::ConversionSettings;

#[derive(Parser, Debug)]
#[command(name = "flywire", version, about = "Convert FlyWire connectome CSV exports into per-neuron JSON", after_help = debug_flags_help())]
struct Cli {
    /// Path to flywire_configuration.toml (searched for when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging for a crate (repeatable)
    #[arg(long = "debug", value_name = "CRATE", global = true)]
    debug: Vec<String>,

    /// Enable debug logging for all crates
    #[arg(long, global = true, default_value_t = false)]
    debug_all: bool,

    /// Hide progress bars
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert the connection table into one JSON document
    Convert {
        /// Connection table (overrides input.connections_path)
        #[arg(long)]
        connections: Option<PathBuf>,

        /// Classification table (overrides input.classification_path)
        #[arg(long)]
        classification: Option<PathBuf>,

        /// Only keep neurons of this class (repeatable)
        #[arg(long = "class", value_name = "CLASS")]
        classes: Vec<String>,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write `<output_dir>/<region><suffix>.json` for each region class
    Regions {
        /// Region classes to convert (defaults to conversion.regions)
        #[arg(long = "region", value_name = "CLASS")]
        regions: Vec<String>,

        /// Output directory (overrides output.dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// List the classes a converted region projects onto
    Downstream {
        /// Converted JSON document
        #[arg(short, long)]
        input: PathBuf,

        /// Classification table (overrides input.classification_path)
        #[arg(long)]
        classification: Option<PathBuf>,
    },

    /// Export connectivity matrices as CSV
    Matrix {
        /// Converted JSON document of the upstream region
        #[arg(long)]
        upstream: PathBuf,

        /// Converted JSON document of the downstream region (same as upstream when omitted)
        #[arg(long)]
        downstream: Option<PathBuf>,

        /// Scale so the strongest connection is 1.0
        #[arg(long, default_value_t = false)]
        normalize: bool,

        /// Output CSV; the reverse direction goes to `<stem>_reverse.csv`
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config_or_default(cli.config.as_deref(), Some(&cli_overrides(&cli)))
        .context("Failed to load configuration")?;

    let mut debug_flags = CrateDebugFlags::from_crate_names(&cli.debug).with_env();
    if cli.debug_all {
        debug_flags.enable_all();
    }
    let logging = init_logging(
        &debug_flags,
        &config.logging.level,
        config.logging.log_dir.clone(),
    )?;
    if let Some(dir) = logging.log_dir() {
        info!("Writing run log under {}", dir.display());
    }

    let settings = ConversionSettings::from_config(&config)?;

    match &cli.command {
        Command::Convert {
            classes, output, ..
        } => run_convert(&config, &settings, classes, output),
        Command::Regions { regions, .. } => run_regions(&config, &settings, regions),
        Command::Downstream { input, .. } => run_downstream(&config, &settings, input),
        Command::Matrix {
            upstream,
            downstream,
            normalize,
            output,
        } => run_matrix(upstream, downstream.as_deref(), *normalize, output),
    }
}

/// Flags that map onto configuration keys
fn cli_overrides(cli: &Cli) -> HashMap<String, String> {
    let mut overrides = HashMap::new();
    let mut set = |key: &str, path: &Option<PathBuf>| {
        if let Some(path) = path {
            overrides.insert(key.to_string(), path.display().to_string());
        }
    };

    match &cli.command {
        Command::Convert {
            connections,
            classification,
            ..
        } => {
            set("connections_path", connections);
            set("classification_path", classification);
        }
        Command::Regions { output_dir, .. } => set("output_dir", output_dir),
        Command::Downstream { classification, .. } => {
            set("classification_path", classification)
        }
        Command::Matrix { .. } => {}
    }

    if cli.quiet {
        overrides.insert("progress".to_string(), "false".to_string());
    }
    overrides
}

fn run_convert(
    config: &FlywireConfig,
    settings: &ConversionSettings,
    classes: &[String],
    output: &Path,
) -> Result<()> {
    let table = read_connections(config, settings)?;

    let mut converter = Converter::new();
    if !classes.is_empty() {
        let classification = read_classification(config, settings)?;
        let mut neurons = Vec::new();
        for class in classes {
            let members = classification.require_class(class).with_context(|| {
                format!("Known classes: {}", classification.class_names().join(", "))
            })?;
            neurons.extend(members);
        }
        info!("Selected {} neurons of {}", neurons.len(), classes.join(", "));
        converter = converter.with_filter(neurons);
    }
    if config.logging.progress {
        converter = converter.with_progress(progress_bar("Converting")?);
    }

    let (connectome, report) = converter.convert_table(&table);
    save_connectome(&connectome, output, settings.json_format)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log_report(&report);

    Ok(())
}

fn run_regions(
    config: &FlywireConfig,
    settings: &ConversionSettings,
    regions: &[String],
) -> Result<()> {
    let regions = if regions.is_empty() {
        &config.conversion.regions[..]
    } else {
        regions
    };

    fs::create_dir_all(&config.output.dir).with_context(|| {
        format!("Failed to create output directory {}", config.output.dir.display())
    })?;

    let table = read_connections(config, settings)?;
    let classification = read_classification(config, settings)?;

    for region in regions {
        let neurons = classification.neurons_of_class(region);
        if neurons.is_empty() {
            warn!("No neurons of class '{}'; writing an empty document", region);
        }

        let mut converter = Converter::new().with_filter(neurons.iter().copied());
        if config.logging.progress {
            converter = converter.with_progress(progress_bar(region)?);
        }
        let (connectome, report) = converter.convert_table(&table);

        let path = config.output.region_path(region);
        save_connectome(&connectome, &path, settings.json_format)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(
            region = region.as_str(),
            class_neurons = neurons.len(),
            "Wrote {}",
            path.display()
        );
        log_report(&report);
    }

    Ok(())
}

fn run_downstream(
    config: &FlywireConfig,
    settings: &ConversionSettings,
    input: &Path,
) -> Result<()> {
    let connectome =
        load_connectome(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let classification = read_classification(config, settings)?;

    let result = downstream_classes(&connectome, &classification);
    println!(
        "{} downstream classes of {} neurons in {}:",
        result.classes.len(),
        connectome.len(),
        input.display()
    );
    for class in &result.classes {
        println!("  {}", class);
    }
    if !result.unclassified.is_empty() {
        println!("  ({} downstream neurons unclassified)", result.unclassified.len());
    }

    Ok(())
}

fn run_matrix(
    upstream: &Path,
    downstream: Option<&Path>,
    normalize: bool,
    output: &Path,
) -> Result<()> {
    let upstream_region = load_connectome(upstream)
        .with_context(|| format!("Failed to read {}", upstream.display()))?;

    let mut matrices = Vec::new();
    match downstream {
        Some(downstream) => {
            let downstream_region = load_connectome(downstream)
                .with_context(|| format!("Failed to read {}", downstream.display()))?;
            matrices.push((
                output.to_path_buf(),
                ConnectivityMatrix::between(&upstream_region, &downstream_region),
            ));
            matrices.push((
                reverse_path(output),
                ConnectivityMatrix::between(&downstream_region, &upstream_region),
            ));
        }
        None => matrices.push((
            output.to_path_buf(),
            ConnectivityMatrix::within(&upstream_region),
        )),
    }

    for (path, mut matrix) in matrices {
        if normalize {
            matrix.normalize();
        }
        matrix
            .save_csv(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

fn read_connections(config: &FlywireConfig, settings: &ConversionSettings) -> Result<ConnectionTable> {
    let path = &config.input.connections_path;
    let table = load_connections(path, &settings.connection_columns, &settings.load_options)
        .with_context(|| format!("Failed to load connections from {}", path.display()))?;
    if !table.skipped.is_empty() {
        warn!(
            "{} malformed rows were skipped while loading {}",
            table.skipped.len(),
            path.display()
        );
    }
    Ok(table)
}

fn read_classification(
    config: &FlywireConfig,
    settings: &ConversionSettings,
) -> Result<ClassificationTable> {
    let path = &config.input.classification_path;
    load_classification(path, &settings.classification_columns, &settings.load_options)
        .with_context(|| format!("Failed to load classification from {}", path.display()))
}

fn progress_bar(label: &str) -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(&format!(
            "  {:<12} {{bar:40.cyan/blue}} {{pos}}/{{len}} rows [{{elapsed_precise}}]",
            label
        ))?
        .progress_chars("##-"),
    );
    Ok(bar)
}

fn log_report(report: &ConversionReport) {
    info!(
        rows_read = report.rows_read,
        rows_grouped = report.rows_grouped,
        rows_filtered = report.rows_filtered,
        rows_skipped = report.rows_skipped,
        neurons = report.neurons,
        "Conversion summary"
    );
}

/// `out/a_b.csv` -> `out/a_b_reverse.csv`
fn reverse_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_reverse.{}", stem, ext.to_string_lossy()),
        None => format!("{}_reverse", stem),
    };
    path.with_file_name(name)
}
