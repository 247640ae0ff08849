//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic writes (tmp → rename)
//! - File-backed score store

pub mod envelope;
pub mod score_file;

pub use envelope::{FORMAT_VERSION, read_json, write_json};
pub use score_file::FileScoreStore;
