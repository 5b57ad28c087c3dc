use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a generator run. All variants are terminal.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("input directory {} does not exist or is not a directory", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    InputUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("path {} is not valid UTF-8", .path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("identifier {ident} is derived from both {first} and {second}")]
    IdentifierCollision {
        ident: String,
        first: String,
        second: String,
    },

    #[error("failed to write {}", .path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type Result<T> = std::result::Result<T, GenerateError>;
