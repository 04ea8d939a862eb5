//! Transport configuration options.
//!
//! Provides a type-safe builder for transport behavior: retry policy
//! and the trust-all TLS opt-in for self-signed demo servers.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use protoo_transport::{RetryPolicy, TransportOptions};
//!
//! let options = TransportOptions::new()
//!     .with_retry_policy(RetryPolicy::new(
//!         5,
//!         2,
//!         Duration::from_millis(500),
//!         Duration::from_secs(4),
//!     ))
//!     .with_danger_accept_invalid_certs();
//! ```

// ============================================================================
// Imports
// ============================================================================

use super::retry::RetryPolicy;

// ============================================================================
// TransportOptions
// ============================================================================

/// Transport configuration.
///
/// Controls reconnect behavior and TLS certificate handling for the
/// lifetime of one transport instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Reconnect backoff policy.
    pub retry: RetryPolicy,

    /// Accept invalid TLS certificates and hostnames.
    ///
    /// Intended only for demo deployments behind self-signed
    /// certificates. Never enable this against production servers.
    pub danger_accept_invalid_certs: bool,
}

// ============================================================================
// Constructors
// ============================================================================

impl TransportOptions {
    /// Creates options with the default retry policy and TLS
    /// verification enabled.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl TransportOptions {
    /// Sets the reconnect backoff policy.
    #[inline]
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Disables TLS certificate and hostname verification (DANGEROUS).
    ///
    /// # Warning
    ///
    /// This makes `wss://` connections vulnerable to man-in-the-middle
    /// attacks. It exists solely for self-signed demo servers and must
    /// never be the default in production use.
    #[inline]
    #[must_use]
    pub fn with_danger_accept_invalid_certs(mut self) -> Self {
        self.danger_accept_invalid_certs = true;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[test]
    fn test_new_creates_default() {
        let options = TransportOptions::new();
        assert_eq!(options.retry, RetryPolicy::default());
        assert!(!options.danger_accept_invalid_certs);
    }

    #[test]
    fn test_builder_chain() {
        let policy = RetryPolicy::new(3, 2, Duration::from_millis(50), Duration::from_millis(200));
        let options = TransportOptions::new()
            .with_retry_policy(policy.clone())
            .with_danger_accept_invalid_certs();

        assert_eq!(options.retry, policy);
        assert!(options.danger_accept_invalid_certs);
    }
}
