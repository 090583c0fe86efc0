//! Error types for the command line tool

use std::path::PathBuf;
use thiserror::Error;

/// Command line errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Flash driver error
    #[error("Flash operation failed: {0}")]
    Flash(#[from] geckoflash_core::Error),

    /// File could not be read or written
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target description did not parse
    #[error("Invalid target description {path}: {source}")]
    TargetConfig {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// Flash options did not parse
    #[error("Invalid flash options {path}: {source}")]
    FlashConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Saved flash image does not match the simulated part
    #[error("{path} holds {actual} bytes, expected {expected}")]
    StateSize {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// Read back data differs from what was written
    #[error("Verification failed at offset 0x{offset:08X}: expected 0x{expected:02X}, got 0x{actual:02X}")]
    Verify { offset: u32, expected: u8, actual: u8 },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for command line operations
pub type Result<T> = std::result::Result<T, CliError>;
