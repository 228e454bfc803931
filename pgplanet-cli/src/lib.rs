//! Command-line interface converting OSM XML into a PostGIS load script.
//!
//! The SQL script goes to standard output; logs and progress go to standard
//! error.
#![forbid(unsafe_code)]

use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pgplanet_core::options::DEFAULT_MAX_ID;
use pgplanet_core::{CancelFlag, ConversionOptions, IdBounds, RunStats, StorageKind, TableName};
use pgplanet_data::{RunOutcome, convert};
use serde::{Deserialize, Serialize};
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod error;

pub use error::CliError;

const ARG_INPUT: &str = "input";
const ARG_MAX_NODE_ID: &str = "max-node-id";
const ARG_MAX_SEGMENT_ID: &str = "max-segment-id";
const ARG_SUPPRESS_DUPLICATES: &str = "suppress-duplicates";
const ARG_STORAGE: &str = "storage";
const ARG_TABLE: &str = "table";
const ARG_STATS_JSON: &str = "stats-json";
const ENV_INPUT: &str = "PGPLANET_CMDS_CONVERT_INPUT";

/// Run the pgplanet CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError::Cancelled`] when a signal stopped the run, and the
/// other variants for argument, configuration, input and conversion failures.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    let config = resolve_convert_config(cli.args)?;
    init_logging();
    let cancel = CancelFlag::default();
    register_signals(&cancel)?;
    execute(&config, io::stdout().lock(), &cancel)
}

fn resolve_convert_config(args: ConvertArgs) -> Result<ConvertConfig, CliError> {
    let merged = args.load_and_merge()?;
    ConvertConfig::try_from(merged)
}

fn init_logging() {
    // A second initialisation only happens under test and is harmless.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn register_signals(cancel: &CancelFlag) -> Result<(), CliError> {
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, cancel.handle()).map_err(CliError::RegisterSignals)?;
    }
    Ok(())
}

fn execute<W: Write>(
    config: &ConvertConfig,
    output: W,
    cancel: &CancelFlag,
) -> Result<(), CliError> {
    let input = pgplanet_fs::open_input(&config.input)?;
    info!(
        "Converting {} into table {}",
        config.input, config.options.table_name
    );
    let report =
        convert(input, output, &config.options, cancel).map_err(|source| CliError::Convert {
            path: config.input.clone(),
            source,
        })?;
    if let Some(path) = &config.stats_json {
        write_stats(path, &report.stats)?;
    }
    match report.outcome {
        RunOutcome::Completed => Ok(()),
        RunOutcome::Cancelled => Err(CliError::Cancelled),
    }
}

fn write_stats(path: &Utf8Path, stats: &RunStats) -> Result<(), CliError> {
    let mut file = pgplanet_fs::create_output_file(path)?;
    let wrap = |source: io::Error| CliError::WriteStats {
        path: path.to_path_buf(),
        source,
    };
    serde_json::to_writer_pretty(&mut file, stats).map_err(|err| wrap(err.into()))?;
    writeln!(file).map_err(wrap)?;
    info!("Wrote run statistics to {path}");
    Ok(())
}

/// Top-level argument parser for the `pgplanet` binary.
#[derive(Debug, Parser)]
#[command(
    name = "pgplanet",
    about = "Convert an OSM XML planet dump into a PostGIS load script",
    version
)]
pub struct Cli {
    #[command(flatten)]
    args: ConvertArgs,
}

/// Conversion settings, layered from flags, environment and config files.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "convert",
    long_about = "Read OSM XML (nodes, segments and ways) and write SQL that \
                 creates and fills a PostGIS table. Settings can come from CLI \
                 flags, configuration files, or environment variables."
)]
#[ortho_config(prefix = "PGPLANET")]
struct ConvertArgs {
    /// OSM XML input; `-` reads standard input, `.bz2` is decompressed.
    #[arg(value_name = ARG_INPUT)]
    #[serde(default)]
    input: Option<Utf8PathBuf>,
    /// Exclusive upper bound for node identifiers.
    #[arg(long = ARG_MAX_NODE_ID, value_name = "id")]
    #[serde(default)]
    max_node_id: Option<u64>,
    /// Exclusive upper bound for segment identifiers.
    #[arg(long = ARG_MAX_SEGMENT_ID, value_name = "id")]
    #[serde(default)]
    max_segment_id: Option<u64>,
    /// Skip nodes, segments and ways already seen with identical content.
    #[arg(long = ARG_SUPPRESS_DUPLICATES, value_name = "bool")]
    #[serde(default)]
    suppress_duplicates: Option<bool>,
    /// Entity store layout: `dense` or `sparse`.
    #[arg(long = ARG_STORAGE, value_name = "kind")]
    #[serde(default)]
    storage: Option<String>,
    /// Name of the table to create.
    #[arg(long = ARG_TABLE, value_name = "name")]
    #[serde(default)]
    table: Option<String>,
    /// Write run statistics as JSON to this path.
    #[arg(long = ARG_STATS_JSON, value_name = "path")]
    #[serde(default)]
    stats_json: Option<Utf8PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConvertConfig {
    input: Utf8PathBuf,
    options: ConversionOptions,
    stats_json: Option<Utf8PathBuf>,
}

impl TryFrom<ConvertArgs> for ConvertConfig {
    type Error = CliError;

    fn try_from(args: ConvertArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_INPUT,
        })?;
        let storage = args
            .storage
            .as_deref()
            .map(str::parse::<StorageKind>)
            .transpose()?
            .unwrap_or_default();
        let table_name = args
            .table
            .map(TableName::new)
            .transpose()?
            .unwrap_or_default();
        let options = ConversionOptions {
            bounds: IdBounds {
                max_point: args.max_node_id.unwrap_or(DEFAULT_MAX_ID),
                max_edge: args.max_segment_id.unwrap_or(DEFAULT_MAX_ID),
            },
            suppress_duplicates: args.suppress_duplicates.unwrap_or(false),
            storage,
            table_name,
        };
        Ok(Self {
            input,
            options,
            stats_json: args.stats_json,
        })
    }
}

#[cfg(test)]
mod tests;
