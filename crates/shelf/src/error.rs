//! CLI error types with miette diagnostics.
//!
//! Classified fetch failures, configuration problems and I/O errors, each
//! with help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use shelf_config::ConfigError;
use shelf_core::{Cause, ClassifiedError, CoreError, ErrorKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NETWORK: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const SERVER: i32 = 9;
    pub const MALFORMED: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Fetch ────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(shelf::fetch_failed), help("{help}"))]
    Fetch {
        kind: ErrorKind,
        message: String,
        attempt: u32,
        help: String,
        #[source]
        cause: Option<Cause>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(shelf::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(shelf::profile_not_found),
        help(
            "Check the profile name, or create a config with: shelf config init\n\
             Config path: {path}"
        )
    )]
    ProfileNotFound { name: String, path: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(shelf::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(shelf::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(shelf::render))]
    Render(String),
}

impl CliError {
    /// Wrap a classified fetch failure, attaching help for the endpoint.
    pub fn fetch(error: &ClassifiedError, attempt: u32, target: &str) -> Self {
        Self::Fetch {
            kind: error.kind(),
            message: error.message().to_owned(),
            attempt,
            help: fetch_help(error.kind(), attempt, target),
            cause: error.cause().cloned(),
        }
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Fetch { kind, .. } => match kind {
                ErrorKind::NetworkUnreachable => exit_code::NETWORK,
                ErrorKind::Timeout => exit_code::TIMEOUT,
                ErrorKind::ServerError(_) => exit_code::SERVER,
                ErrorKind::MalformedResponse => exit_code::MALFORMED,
                ErrorKind::Unknown => exit_code::GENERAL,
            },
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

fn fetch_help(kind: ErrorKind, attempt: u32, target: &str) -> String {
    let tries = if attempt == 1 {
        "1 attempt".to_owned()
    } else {
        format!("{attempt} attempts")
    };
    let hint = match kind {
        ErrorKind::NetworkUnreachable => {
            "Check that the catalog server is running and reachable.\n\
             Try: shelf list --simulate"
        }
        ErrorKind::Timeout => "Increase the deadline with --timeout-ms or retry with --retries.",
        ErrorKind::ServerError(_) => "The server answered with an error status; retry later.",
        ErrorKind::MalformedResponse => "The endpoint did not return a JSON list of items.",
        ErrorKind::Unknown => "Re-run with -vv for details.",
    };
    format!("Gave up after {tries} against {target}.\n{hint}")
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                path: shelf_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTimeout => Self::Validation {
                field: "timeout_ms".into(),
                reason: err.to_string(),
            },
            CoreError::Source(source) => Self::Validation {
                field: "endpoint".into(),
                reason: source.to_string(),
            },
        }
    }
}
