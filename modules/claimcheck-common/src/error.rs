use std::path::PathBuf;

use thiserror::Error;

/// Fatal audit errors. Anything recoverable is reported as a process issue
/// in the audit result instead.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to read metadata listing {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata listing {path} is not a valid record array: {reason}")]
    MetadataParse { path: PathBuf, reason: String },

    #[error("Corpus directory {path} is unreadable: {source}")]
    CorpusUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
