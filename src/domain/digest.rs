//! Digest and cipher algorithm domain types.
//!
//! Signaturelets declare the digest they hash with and the cipher their key
//! uses. Registration refuses descriptors whose digest is not supported by
//! the crypto backend.

use crate::infra::error::SigningError;
use std::fmt;
use std::str::FromStr;

/// Digest algorithms a signaturelet may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// No digest; never accepted at registration.
    None,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha1,
}

impl DigestAlgorithm {
    #[must_use]
    pub fn is_supported(self) -> bool {
        !matches!(self, DigestAlgorithm::None)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::None => "none",
            DigestAlgorithm::Sha224 => "sha224",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha384 => "sha384",
            DigestAlgorithm::Sha512 => "sha512",
            DigestAlgorithm::Sha1 => "sha1",
        }
    }

    /// Size in bytes of a digest produced by this algorithm.
    #[must_use]
    pub fn digest_size(self) -> usize {
        match self {
            DigestAlgorithm::None => 0,
            DigestAlgorithm::Sha224 => 28,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
            DigestAlgorithm::Sha1 => 20,
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha224" | "sha-224" => Ok(DigestAlgorithm::Sha224),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha384" | "sha-384" => Ok(DigestAlgorithm::Sha384),
            "sha512" | "sha-512" => Ok(DigestAlgorithm::Sha512),
            "sha1" | "sha-1" => Ok(DigestAlgorithm::Sha1),
            _ => Err(SigningError::ValidationError(format!(
                "Unsupported digest algorithm: {s}"
            ))),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cipher algorithm of the signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    None,
    Rsa,
}

impl CipherAlgorithm {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CipherAlgorithm::None => "none",
            CipherAlgorithm::Rsa => "rsa",
        }
    }
}

impl FromStr for CipherAlgorithm {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" => Ok(CipherAlgorithm::Rsa),
            _ => Err(SigningError::ValidationError(format!(
                "Unsupported cipher algorithm: {s}"
            ))),
        }
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
