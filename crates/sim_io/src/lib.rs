//! crates/sim_io/src/lib.rs
//! Minimal, single-source-of-truth I/O crate.
//!
//! - Strict loaders for the reference-data and scenario JSON files.
//! - Canonical JSON (sorted keys, compact) with atomic writes.
//! - SHA-256 digests over canonical bytes.
//!
//! The engine itself never touches the filesystem; this crate is the boundary.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for sim_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, ...)
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON syntax or type errors, with a JSON Pointer where one is known.
    #[error("json error at {pointer}: {msg}")]
    Json {
        pointer: String,
        msg: String,
    },

    /// Structurally valid JSON in the wrong shape (e.g. a pairing that is not a 2-array).
    #[error("schema error at {pointer}: {msg}")]
    Schema {
        pointer: String,
        msg: String,
    },

    /// Values that parse but break a reference-data invariant.
    #[error("invalid: {0}")]
    Invalid(String),

    /// Input larger than the loader accepts.
    #[error("limit exceeded: {0}")]
    Limit(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

impl IoError {
    pub(crate) fn schema(pointer: impl Into<String>, msg: impl Into<String>) -> Self {
        IoError::Schema { pointer: pointer.into(), msg: msg.into() }
    }
}

/* ---------------- Public modules ---------------- */

pub mod canonical_json;
pub mod hasher;
pub mod loader;

pub use loader::{load_inputs, InputDigests, LoadedInputs};
