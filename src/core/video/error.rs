use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("image encode error: {0}")]
    Image(String),
    #[error("video source unreadable: {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },
    #[error("{0} not found on PATH")]
    BinaryNotFound(&'static str),
    #[error("ffprobe output parse error: {0}")]
    Probe(#[from] serde_json::Error),
}
