// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Engine Error Types
 * Typed errors for pattern construction and probe transport
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::time::Duration;
use thiserror::Error;

/// Construction-time errors. These are the only errors allowed to abort
/// setup; everything that can fail during a scan is converted into a
/// structured outcome instead.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A pattern in a PatternSet failed to compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A literal needle set could not be turned into an automaton
    #[error("Invalid needle set: {0}")]
    InvalidNeedles(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Per-probe transport failures. Reported inside a ProbeOutcome, never
/// fatal to the batch that produced them.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Connection timeout after {timeout:?} to {url}")]
    ConnectionTimeout { url: String, timeout: Duration },

    #[error("Connection reset by peer for {url}")]
    ConnectionReset { url: String },

    #[error("Connection refused for {url}")]
    ConnectionRefused { url: String },

    #[error("DNS resolution failed for {host}: {reason}")]
    DnsResolutionFailed { host: String, reason: String },

    #[error("TLS handshake failed for {host}: {reason}")]
    TlsHandshakeFailed { host: String, reason: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::ConnectionTimeout { .. })
    }

    /// Check if the failure is worth retrying on a later probe
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::ConnectionTimeout { .. } => true,
            TransportError::ConnectionReset { .. } => true,
            TransportError::ConnectionRefused { .. } => false,
            TransportError::DnsResolutionFailed { .. } => false,
            TransportError::TlsHandshakeFailed { .. } => false,
            TransportError::InvalidUrl { .. } => false,
            TransportError::Other(_) => false,
        }
    }
}

/// Result type for engine construction operations
pub type EngineResult<T> = Result<T, EngineError>;
