#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the repostat crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Only fatal conditions are represented here. Per-repository fetch failures
//! never surface as [`Error`]; the API client logs them and reports "no data".

use std::path::{Path, PathBuf};

/// Unified error type returned by the configuration loader, the updater and
/// the CLI.
#[derive(Debug, masterror::Error)]
pub enum Error
{
    /// Wraps I/O errors that occur while reading the tracking configuration or
    /// the target document.
    #[error("failed to read {path:?}: {source}")]
    Io
    {
        /// Location of the file being read.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Wraps I/O errors raised while writing the document or the summary.
    #[error("failed to write {path:?}: {source}")]
    Write
    {
        /// Location of the file being written.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Wraps YAML decoding errors of the tracking configuration.
    #[error("failed to parse tracking configuration: {source}")]
    Parse
    {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error,
    },
    /// Returned when the tracking configuration violates invariants.
    #[error("invalid tracking configuration: {message}")]
    Validation
    {
        /// Human readable message describing the validation problem.
        message: String,
    },
    /// Returned when process configuration (credentials, API endpoint) is
    /// missing or unusable.
    #[error("configuration error: {message}")]
    Configuration
    {
        /// Human readable message describing the configuration problem.
        message: String,
    },
    /// Returned when not a single repository produced a table row.
    #[error("no repositories were successfully processed ({attempted} attempted)")]
    NoRows
    {
        /// Number of repositories the run tried to process.
        attempted: usize,
    },
}

impl Error
{
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M,>(message: M,) -> Self
    where
        M: Into<String,>,
    {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Constructs a configuration error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the configuration problem.
    pub fn configuration<M,>(message: M,) -> Self
    where
        M: Into<String,>,
    {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self,) -> String
    {
        format!("{self}")
    }
}

impl From<serde_yaml::Error,> for Error
{
    fn from(source: serde_yaml::Error,) -> Self
    {
        Self::Parse {
            source,
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that could not be read.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error,) -> Error
{
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Creates an [`Error::Write`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that could not be written.
/// * `source` - I/O error reported by the operating system.
pub fn write_error(path: &Path, source: std::io::Error,) -> Error
{
    Error::Write {
        path: path.to_path_buf(),
        source,
    }
}
