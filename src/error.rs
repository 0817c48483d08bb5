//! Error types for tfhooks.
//!
//! This module defines the error hierarchy using `thiserror`. Every variant
//! records where in the crate it was raised, which keeps `-vvv` output useful
//! when a hook misbehaves inside a pre-commit run.
//!
//! # Error Categories
//!
//! - **IO errors**: unreadable or non-UTF-8 `.tf` files
//! - **Config errors**: tag policy files or rule lists that cannot be parsed
//!
//! Tag, provider and module findings are *not* errors. They are collected as
//! data by the checkers and decide the exit code on their own.
//!
//! # Example
//!
//! ```rust
//! use tfhooks::error::{HookError, Result};
//!
//! fn read(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .map_err(|e| HookError::io(path, e, file!(), line!()))
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Macro to create errors with automatic source location tracking.
///
/// Usage:
/// ```ignore
/// return Err(err!(ConfigValue { key: "required_tags".to_string(), message }));
/// ```
#[macro_export]
macro_rules! err {
    ($variant:ident { $($field:ident: $value:expr),* $(,)? }) => {
        $crate::error::HookError::$variant {
            $($field: $value,)*
            src_path: file!(),
            src_line: line!(),
        }
    };
}

/// A specialized Result type for tfhooks operations.
pub type Result<T> = std::result::Result<T, HookError>;

/// Exit code for a run that found violations.
pub const EXIT_VIOLATIONS: u8 = 1;

/// Exit code for a run aborted by a configuration problem.
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// The main error type for tfhooks.
#[derive(Error, Debug)]
pub enum HookError {
    // =========================================================================
    // I/O and File System Errors
    // =========================================================================
    /// I/O error with path context.
    #[error("I/O error at '{path}' ({src_path}:{src_line}): {source}")]
    Io {
        /// The path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// A file that must not be overwritten already exists.
    #[error("Refusing to overwrite existing file: {path} ({src_path}:{src_line})")]
    ConfigExists {
        /// The existing file
        path: PathBuf,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A policy file exists but none of the loaders could parse it.
    #[error("Failed to parse configuration '{path}' ({src_path}:{src_line}): {message}")]
    ConfigParse {
        /// The configuration file
        path: PathBuf,
        /// Error message, including every loader's complaint
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Invalid configuration value, e.g. a malformed `--required-tags` list.
    #[error("Invalid configuration value for '{key}' ({src_path}:{src_line}): {message}")]
    ConfigValue {
        /// The configuration key
        key: String,
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },
}

impl HookError {
    /// Creates an `Io` error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error, src_path: &'static str, src_line: u32) -> Self {
        Self::Io { path: path.into(), source, src_path, src_line }
    }

    /// Creates a `ConfigParse` error.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: String, src_path: &'static str, src_line: u32) -> Self {
        Self::ConfigParse { path: path.into(), message, src_path, src_line }
    }

    /// Whether the error means the run could not safely start.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::ConfigParse { .. } | Self::ConfigValue { .. })
    }

    /// Returns the appropriate exit code for the error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        if self.is_configuration_error() {
            EXIT_CONFIG_ERROR
        } else {
            EXIT_VIOLATIONS
        }
    }

    /// A short, location-free description suitable for hook output.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Io { source, .. } => source.to_string(),
            Self::ConfigExists { path, .. } => format!("{} already exists", path.display()),
            Self::ConfigParse { message, .. } | Self::ConfigValue { message, .. } => message.clone(),
        }
    }
}

/// Extension trait for `Result` to add path context to I/O errors.
pub trait ResultExt<T> {
    /// Adds a file path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| HookError::Io {
            path: path.into(),
            source,
            src_path: file!(),
            src_line: line!(),
        })
    }
}
