use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the contact pipeline.
///
/// Configuration and missing-input errors abort a run. The symmetry fallback is
/// not an error: it is recovered inside the pipeline and only logged.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("invalid configuration: {}", .0.join("; "))]
    Config(Vec<String>),

    #[error("unknown symmetry group '{0}'")]
    UnknownSymmetry(String),

    #[error("failed to read chain map: {0}")]
    ChainMap(String),

    #[error("chain '{chain}' is not assigned to any group ({file}, line {line})")]
    UnknownChain {
        chain: String,
        file: PathBuf,
        line: usize,
    },

    #[error("failed to parse {file} at line {line}: {details}")]
    Parse {
        file: PathBuf,
        line: usize,
        details: String,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("contact store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("no contact report produced any rows")]
    NoResults,
}

impl ContactError {
    pub fn parse(file: impl Into<PathBuf>, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            details: details.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContactError>;
