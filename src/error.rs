use std::fmt::Display;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems with the settings or mapping document. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("mapping {} has no defaultTaskType", path.display())]
    MissingDefaultTaskType { path: PathBuf },

    #[error("missing setting `{key}` (set it in the config file or via {env})")]
    MissingSetting {
        key: &'static str,
        env: &'static str,
    },
}

/// Failure talking to one of the remote services.
///
/// Reads and writes are kept apart because callers recover from them differently:
/// a failed lookup degrades to "not found", a failed write is logged and reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("failed to {operation}: {message}")]
    Read {
        operation: &'static str,
        message: String,
    },

    #[error("failed to {operation}: {message}")]
    Write {
        operation: &'static str,
        message: String,
    },
}

impl GatewayError {
    pub fn read(operation: &'static str, err: impl Display) -> Self {
        Self::Read {
            operation,
            message: format!("{err:#}"),
        }
    }

    pub fn write(operation: &'static str, err: impl Display) -> Self {
        Self::Write {
            operation,
            message: format!("{err:#}"),
        }
    }
}
