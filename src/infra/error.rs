//! Error handling types and result definitions for the signing subsystem.

use crate::adapters::crypto::CryptoError;
use crate::domain::flags::SignFlags;
use crate::domain::suffix::SuffixPatternError;
use thiserror::Error;

/// Result type for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

/// Comprehensive error types for signing operations
#[derive(Error, Debug, miette::Diagnostic)]
pub enum SigningError {
    #[error("Invalid signaturelet descriptor: {0}")]
    #[diagnostic(code(libsign::invalid_descriptor))]
    InvalidDescriptor(String),

    #[error("Signaturelet {0} is already registered")]
    #[diagnostic(code(libsign::already_registered))]
    AlreadyRegistered(String),

    #[error("Signaturelet {0} not found")]
    #[diagnostic(code(libsign::not_found))]
    NotFound(String),

    #[error("Failed to load signaturelet: {0}")]
    #[diagnostic(
        code(libsign::load_error),
        help("Define $LD_LIBRARY_PATH so that <dir>/signaturelet/<id>.siglet can be located")
    )]
    LoadError(String),

    #[error("Invalid signing request: {0}")]
    #[diagnostic(code(libsign::validation_error))]
    ValidationError(String),

    #[error("Signature creation error: {0}")]
    #[diagnostic(code(libsign::signature_error))]
    SignatureError(String),

    #[error("No suffix pattern of signaturelet {id} matches flags {flags:?}")]
    #[diagnostic(
        code(libsign::no_matching_pattern),
        help("Pass explicit output paths or use a flag combination the signaturelet declares")
    )]
    NoMatchingPattern { id: String, flags: SignFlags },

    #[error("IO error: {0}")]
    #[diagnostic(code(libsign::io_error))]
    IoError(String),

    #[error("Malformed signature container: {0}")]
    #[diagnostic(code(libsign::container_error))]
    ContainerError(String),

    #[error("Cryptographic error: {0}")]
    #[diagnostic(code(libsign::cryptographic_error))]
    CryptographicError(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(libsign::configuration_error))]
    ConfigurationError(String),
}

impl From<std::io::Error> for SigningError {
    fn from(error: std::io::Error) -> Self {
        SigningError::IoError(error.to_string())
    }
}

impl From<CryptoError> for SigningError {
    fn from(error: CryptoError) -> Self {
        SigningError::CryptographicError(error.to_string())
    }
}

impl From<SuffixPatternError> for SigningError {
    fn from(error: SuffixPatternError) -> Self {
        SigningError::InvalidDescriptor(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SigningError::NotFound("SELoader".to_string());
        assert_eq!(error.to_string(), "Signaturelet SELoader not found");

        let error = SigningError::ValidationError("Invalid flags (0x3)".to_string());
        assert_eq!(error.to_string(), "Invalid signing request: Invalid flags (0x3)");
    }

    #[test]
    fn test_suffix_error_becomes_invalid_descriptor() {
        let error: SigningError = SuffixPatternError::MissingFlag { index: 2 }.into();
        match error {
            SigningError::InvalidDescriptor(msg) => assert!(msg.contains("pattern 2")),
            other => panic!("Wrong error type: {other:?}"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: SigningError = io.into();
        assert!(matches!(error, SigningError::IoError(msg) if msg == "gone"));
    }

    #[test]
    fn test_crypto_error_conversion() {
        let crypto = CryptoError::UnsupportedDigest(crate::domain::digest::DigestAlgorithm::None);
        let error: SigningError = crypto.into();
        assert!(matches!(error, SigningError::CryptographicError(_)));
    }
}
