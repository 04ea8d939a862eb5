//! Trust-all TLS configuration for self-signed demo servers.
//!
//! The reference signalling deployment runs behind a self-signed
//! certificate, so the transport offers an explicit opt-in that skips
//! certificate and hostname verification. It is never the default;
//! see [`TransportOptions::with_danger_accept_invalid_certs`].
//!
//! [`TransportOptions::with_danger_accept_invalid_certs`]:
//!     crate::TransportOptions::with_danger_accept_invalid_certs

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustls::ClientConfig;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};

use crate::error::{Error, Result};

// ============================================================================
// DangerousVerifier
// ============================================================================

/// A certificate verifier that accepts every certificate and hostname.
///
/// Only reachable through the explicit insecure opt-in.
#[derive(Debug)]
struct DangerousVerifier;

impl ServerCertVerifier for DangerousVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

// ============================================================================
// Config Builder
// ============================================================================

/// Builds a rustls `ClientConfig` that accepts invalid certificates.
///
/// # Errors
///
/// Returns [`Error::Tls`] if the protocol versions are rejected by the
/// crypto provider.
pub(crate) fn insecure_client_config() -> Result<Arc<ClientConfig>> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::tls(format!("unsupported protocol versions: {e}")))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(DangerousVerifier))
        .with_no_client_auth();

    Ok(Arc::new(config))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insecure_config_builds() {
        let config = insecure_client_config().expect("config should build");
        // No client auth is configured for the demo opt-in.
        assert!(!config.client_auth_cert_resolver.has_certs());
    }

    #[test]
    fn test_verifier_accepts_all_schemes_nonempty() {
        let verifier = DangerousVerifier;
        assert!(!verifier.supported_verify_schemes().is_empty());
    }
}
