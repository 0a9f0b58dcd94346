//! Error types for the acceleration library.
//!
//! Per-tunable problems (missing tools, denied permissions, failed
//! commands) are never errors here; they are `Change` outcomes. This
//! enum covers the few things that genuinely abort an invocation:
//! malformed caller input and an unusable state file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccelError {
    /// The two scope filters are mutually exclusive.
    #[error("cannot combine --cpu-only and --gpu-only")]
    ConflictingScope,

    /// Only one of --on / --off / --status / --doctor may be given.
    #[error("use only one of --on, --off, --status, --doctor")]
    ConflictingModes,

    #[error("failed to read state file {path}: {source}")]
    StateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A corrupt record is surfaced, not defaulted: it drives mutating
    /// restores.
    #[error("state file {path} is not valid JSON: {source}")]
    StateParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write state file {path}: {source}")]
    StateWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AccelError {
    /// Exit code for the CLI: usage errors exit 2, everything else 4.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConflictingScope | Self::ConflictingModes => 2,
            _ => 4,
        }
    }
}
