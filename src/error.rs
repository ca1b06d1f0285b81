// src/error.rs

//! Error types for recipe parsing and cooking

use crate::recipe::Phase;
use thiserror::Error;

/// Result type alias for larder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while reading, validating or cooking a recipe
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// An external command exited non-zero (or was killed by a signal)
    ///
    /// The captured output is carried verbatim; nothing here interprets it.
    #[error("{phase} step '{step}' failed ({status}): {command}{}", format_output(.stdout, .stderr))]
    CommandFailed {
        phase: Phase,
        step: String,
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    /// A copy rule matched nothing in the staging tree
    #[error("Expected file missing: {0}")]
    MissingFile(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Work directory is not empty: {0}")]
    WorkDirNotEmpty(String),
}

fn format_output(stdout: &str, stderr: &str) -> String {
    let mut out = String::new();
    if !stdout.is_empty() {
        out.push_str("\nstdout:\n");
        out.push_str(stdout.trim_end());
    }
    if !stderr.is_empty() {
        out.push_str("\nstderr:\n");
        out.push_str(stderr.trim_end());
    }
    out
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::IoError(err.to_string())
    }
}
