//! Error type shared by the library core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Required base statistic names without any matching metadata entry.
    #[error("no metadata mapping for required statistics: {}", .0.join(", "))]
    UnresolvedStatistics(Vec<String>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The template file could not be located or read.
    #[error("template `{name}` unavailable")]
    TemplateUnavailable {
        name: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
