//! Error types for wpick-core.
//!
//! [`LoadError`] is never surfaced across the loader boundary: every variant
//! collapses into an empty delivery. It exists so that callers can observe
//! *why* a load came back empty (error hook, logs, [`Outcome`](crate::loader::Outcome)).

use thiserror::Error;

/// Why a single option load produced no results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Connection refused, reset, DNS failure, …
    #[error("network error: {0}")]
    Network(String),
    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned HTTP {0}")]
    Status(u16),
    /// The body was not a JSON array of recognisable records.
    #[error("malformed payload: {0}")]
    Parse(String),
    /// The query was shorter than the picker's minimum; no request was sent.
    #[error("query shorter than {min} characters")]
    EmptyQuery { min: usize },
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

/// Invalid picker or site configuration. Unlike [`LoadError`], these are
/// hard errors reported at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("per_page must be between 1 and 100, got {0}")]
    PerPage(u32),
    #[error("attribute key must not be empty")]
    EmptyAttributeKey,
    #[error("taxonomy must not be empty")]
    EmptyTaxonomy,
    #[error("site URL {0:?} must start with http:// (TLS is not supported)")]
    Scheme(String),
    #[error("error hook must be installed before the first request")]
    LateErrorHook,
}
