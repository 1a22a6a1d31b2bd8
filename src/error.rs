//! Error types for throughput telemetry processing.
//!
//! Nothing in this crate is fatal. A malformed attribute update is dropped
//! by the caller, an unknown tag is ignored, and an unrecognised enum code is
//! folded into an explicit `Unknown` variant before it ever becomes an error.
//!
//! ## Error Categories
//!
//! - **Decode Errors**: payload too short for its attribute tag
//! - **Tag Errors**: attribute names that are not part of the throughput service
//! - **Runtime Errors**: sampler created outside a tokio runtime
//! - **Config Errors**: invalid or unreadable monitor configuration
//! - **Feed Errors**: failures reported by the attribute input feed
//!
//! ## Recovery
//!
//! ```rust
//! use throughput::{AttributeTag, ThroughputError};
//!
//! let error = ThroughputError::malformed(AttributeTag::PhyStatus, 1, 0);
//! assert!(error.is_recoverable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::AttributeTag;

/// Result type alias for throughput operations.
pub type Result<T, E = ThroughputError> = std::result::Result<T, E>;

/// Main error type for throughput operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ThroughputError {
    #[error("Malformed {tag} payload: expected at least {expected} bytes, got {actual}")]
    MalformedPayload { tag: AttributeTag, expected: usize, actual: usize },

    #[error("Unknown attribute tag '{name}'")]
    UnknownTag { name: String },

    #[error("Tokio runtime unavailable: {reason}")]
    Runtime { reason: String },

    #[error("Invalid configuration: {reason}")]
    Config {
        reason: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Attribute feed failed: {reason}")]
    Feed {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ThroughputError {
    /// Returns whether the offending input can simply be dropped and processing continued.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ThroughputError::MalformedPayload { .. } => true,
            ThroughputError::UnknownTag { .. } => true,
            ThroughputError::Feed { .. } => true,
            ThroughputError::Runtime { .. } => false,
            ThroughputError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ThroughputError::MalformedPayload { .. } => vec![
                "Drop the update and wait for the next one",
                "Check the peer firmware reports the expected characteristic format",
            ],
            ThroughputError::UnknownTag { .. } => vec![
                "Ignore attributes outside the throughput service",
                "Check the attribute name spelling",
            ],
            ThroughputError::Runtime { .. } => vec![
                "Create the monitor from within a tokio runtime",
                "Pass an explicit runtime handle with `with_runtime`",
            ],
            ThroughputError::Config { .. } => vec![
                "Check the configuration file exists and is readable",
                "Use a sample period greater than zero",
                "Compare against the default configuration",
            ],
            ThroughputError::Feed { .. } => vec![
                "Check the transport is still connected",
                "Restart the feed driver once the link is re-established",
            ],
        }
    }

    /// Helper constructor for payloads shorter than their tag requires.
    pub fn malformed(tag: AttributeTag, expected: usize, actual: usize) -> Self {
        ThroughputError::MalformedPayload { tag, expected, actual }
    }

    /// Helper constructor for unknown attribute names.
    pub fn unknown_tag(name: impl Into<String>) -> Self {
        ThroughputError::UnknownTag { name: name.into() }
    }

    /// Helper constructor for missing runtime errors.
    pub fn runtime_unavailable(reason: impl Into<String>) -> Self {
        ThroughputError::Runtime { reason: reason.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        ThroughputError::Config { reason: reason.into(), path: None, source: None }
    }

    /// Helper constructor for configuration errors tied to a file.
    pub fn config_file(
        path: PathBuf,
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        ThroughputError::Config { reason: reason.into(), path: Some(path), source: Some(source) }
    }

    /// Helper constructor for feed errors.
    pub fn feed_failed(reason: impl Into<String>) -> Self {
        ThroughputError::Feed { reason: reason.into(), source: None }
    }

    /// Helper constructor for feed errors with source.
    pub fn feed_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        ThroughputError::Feed { reason: reason.into(), source: Some(source) }
    }
}

impl From<serde_yaml_ng::Error> for ThroughputError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        ThroughputError::Config {
            reason: format!("YAML parse failed: {}", err),
            path: None,
            source: Some(Box::new(err)),
        }
    }
}
