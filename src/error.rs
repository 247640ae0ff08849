//! Error type for the fallible edges of the crate (files, JSON, tuning).
//!
//! The simulation itself never fails; only loading and saving can.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported file version {found} in {}", .path.display())]
    UnsupportedVersion { path: PathBuf, found: u32 },
    #[error("invalid tuning value `{field}`: {reason}")]
    InvalidTuning { field: &'static str, reason: String },
    #[error("score service is no longer running")]
    ServiceStopped,
}
