use std::path::PathBuf;
use thiserror::Error;

use objedit_core::{DecodeError, DetectError, EditError, EncodeError};

/// Fatal errors for an objedit run. Any of these means no output was written.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Detection(#[from] DetectError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] EncodeError),
}
