//! Error types emitted by the pgplanet CLI.
//!
//! Keep this error type reasonably small, as CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use pgplanet_core::options::InvalidTableName;
use pgplanet_core::store::ParseStorageKindError;
use pgplanet_data::ConvertError;
use pgplanet_fs::FsError;
use thiserror::Error;

/// Errors emitted by the pgplanet CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (pass it as an argument or set {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The configured table name is not a plain SQL identifier.
    #[error(transparent)]
    InvalidTableName(#[from] InvalidTableName),
    /// The configured storage layout is unknown.
    #[error(transparent)]
    InvalidStorage(#[from] ParseStorageKindError),
    /// Opening the input or creating an output file failed.
    #[error(transparent)]
    Fs(#[from] FsError),
    /// The conversion of `path` aborted.
    #[error("failed to convert {path}: {source}")]
    Convert {
        path: Utf8PathBuf,
        #[source]
        source: ConvertError,
    },
    /// Serializing or writing the statistics file failed.
    #[error("failed to write run statistics to {path:?}: {source}")]
    WriteStats {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Installing a signal handler failed.
    #[error("failed to register signal handlers: {0}")]
    RegisterSignals(#[source] std::io::Error),
    /// The run was stopped by a signal; the script ends at the last record.
    #[error("conversion cancelled; output is truncated but loadable")]
    Cancelled,
}
