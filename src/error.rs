#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the top-langs crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the fetcher, renderer and CLI.
///
/// Only the binary entry point converts these into exit codes. Inner
/// components either propagate them or, for per-repository language lookups,
/// skip the repository (see [`Error::is_http_failure`]).
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// The API answered with a non-success status code.
    #[error("request to {url} failed with HTTP {status}")]
    Http {
        /// Requested URL.
        url:    String,
        /// Status code returned by the API.
        status: u16
    },
    /// The API kept signalling an exhausted rate limit.
    #[error("request to {url} failed with HTTP {status}: rate limit still exceeded after {attempts} attempts")]
    RateLimited {
        /// Requested URL.
        url:      String,
        /// Status code of the final response.
        status:   u16,
        /// Number of attempts performed, including the initial one.
        attempts: u32
    },
    /// Transport level failure before a status code was received.
    #[error("network error: {message}")]
    Network {
        /// Human readable description reported by the HTTP client.
        message: String
    },
    /// Response body could not be decoded as the expected JSON document.
    #[error("failed to decode API response: {source}")]
    Decode {
        /// Underlying decoding error.
        source: serde_json::Error
    },
    /// Wraps I/O errors raised while reading the style file or writing the
    /// chart.
    #[error("failed to access {path:?}: {source}")]
    Io {
        /// Location of the file being processed.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors for chart style documents.
    #[error("failed to parse chart style: {source}")]
    Style {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when user supplied input violates invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a network error from the provided displayable value.
    pub fn network<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Network {
            message: message.into()
        }
    }

    /// Returns `true` for failures reported through an HTTP status code.
    ///
    /// Both plain status failures and exhausted rate limits qualify.
    /// Transport, decoding and local errors do not.
    pub fn is_http_failure(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::RateLimited { .. })
    }

    /// Formats the error for diagnostics without the variant name.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Decode {
            source
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Style {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}
