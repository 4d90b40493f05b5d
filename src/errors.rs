// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for claim publication.
//!
//! Every stage of the pipeline (token encoding, key loading, target resolution,
//! update transmission) returns a [`PublishError`]. The publication driver is the
//! only place that decides whether an error aborts the run or is logged and
//! skipped; see [`PublishError::is_fatal`].

use hickory_client::op::ResponseCode;
use thiserror::Error;

/// Errors that can occur while encoding, resolving, or publishing a claim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Malformed token, base64 segment, or JSON document.
    #[error("Decoding failed: {reason}")]
    Decoding {
        /// What could not be decoded
        reason: String,
    },

    /// Conflicting or missing options, or an unusable TSIG key.
    ///
    /// Raised before any record is processed and always aborts the run.
    #[error("Invalid configuration: {reason}")]
    Configuration {
        /// Explanation of what is invalid
        reason: String,
    },

    /// The claim's target URI cannot be published to.
    ///
    /// Covers a wrong scheme, a class/type other than the expected ones, and an
    /// owner name that is not inside the configured zone.
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget {
        /// The target URI (or owner name) that was rejected
        target: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// Record data that cannot be placed in an update (e.g. no character-strings).
    #[error("Invalid record data for '{name}': {reason}")]
    InvalidRecordData {
        /// The owner name of the record
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// No SOA/MNAME for the zone, or the primary server's name has no address.
    #[error("Failed to resolve primary server for zone '{zone}': {reason}")]
    Resolution {
        /// The zone whose primary server was being looked up
        zone: String,
        /// Specific reason for the failure
        reason: String,
    },

    /// Connection failure, timeout, or malformed response from the server.
    #[error("Transport to server {server} failed: {reason}")]
    Transport {
        /// The DNS server (IP:port) the update was sent to
        server: String,
        /// Specific reason for the failure
        reason: String,
    },

    /// The server answered the update with a response code other than `NOERROR`.
    #[error("Update of zone '{zone}' rejected by server {server} with response code {code}")]
    Protocol {
        /// The zone the update was scoped to
        zone: String,
        /// The DNS server (IP:port) that answered
        server: String,
        /// The response code returned by the server
        code: ResponseCode,
    },
}

impl PublishError {
    /// Shorthand for a [`PublishError::Decoding`] error.
    pub fn decoding(reason: impl Into<String>) -> Self {
        Self::Decoding {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`PublishError::Configuration`] error.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`PublishError::InvalidTarget`] error.
    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Attribute a resolution failure to `zone`. Other errors are returned unchanged.
    #[must_use]
    pub fn in_zone(self, zone: impl Into<String>) -> Self {
        match self {
            Self::Resolution { reason, .. } => Self::Resolution {
                zone: zone.into(),
                reason,
            },
            other => other,
        }
    }

    /// Returns true if this error must stop the run before any record is processed.
    ///
    /// Only configuration errors are fatal. Everything else is scoped to a single
    /// claim record and the batch continues with the next one.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns a stable label for this error, used in log fields and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decoding { .. } => "DecodingError",
            Self::Configuration { .. } => "ConfigurationError",
            Self::InvalidTarget { .. } => "InvalidTargetError",
            Self::InvalidRecordData { .. } => "InvalidRecordData",
            Self::Resolution { .. } => "ResolutionError",
            Self::Transport { .. } => "TransportError",
            Self::Protocol { .. } => "ProtocolError",
        }
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        Self::decoding(err.to_string())
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
