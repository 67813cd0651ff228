use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextShiftError {
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Malformed source: {0}")]
    MalformedSource(String),

    #[error("Group not found: {title} ({uuid})")]
    GroupNotFound { uuid: String, title: String },

    #[error("Unknown {field} code: {code}")]
    UnknownCode { field: &'static str, code: u64 },

    #[error("Target unwritable: {}: {source}", .path.display())]
    TargetUnwritable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TextShiftError>;
