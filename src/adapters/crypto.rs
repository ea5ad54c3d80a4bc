//! OpenSSL-backed crypto operations.
//!
//! Key and certificate loading, digests and PKCS#7 signing. Loaded objects are
//! plain owned OpenSSL handles and are freed when dropped, so every early
//! return releases what was acquired before it.

use crate::domain::digest::DigestAlgorithm;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, Private};
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures reported by the crypto backend.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse PEM-encoded private key {path}: {source}")]
    PrivateKey {
        path: PathBuf,
        source: openssl::error::ErrorStack,
    },

    #[error("failed to parse PEM-encoded X.509 certificate {path}: {source}")]
    Certificate {
        path: PathBuf,
        source: openssl::error::ErrorStack,
    },

    #[error("unsupported digest algorithm {0}")]
    UnsupportedDigest(DigestAlgorithm),

    #[error("PKCS#7 operation failed: {0}")]
    Pkcs7(#[from] openssl::error::ErrorStack),
}

/// Make `alg` available to the backend before the first signature.
pub fn digest_init(alg: DigestAlgorithm) -> Result<(), CryptoError> {
    if !alg.is_supported() {
        return Err(CryptoError::UnsupportedDigest(alg));
    }
    openssl::init();
    log::debug!("Digest algorithm {alg} initialized");
    Ok(())
}

/// Compute `alg` over `data`.
pub fn digest(alg: DigestAlgorithm, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let out = match alg {
        DigestAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
        DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        DigestAlgorithm::Sha1 => openssl::sha::sha1(data).to_vec(),
        DigestAlgorithm::None => return Err(CryptoError::UnsupportedDigest(alg)),
    };
    debug_assert_eq!(out.len(), alg.digest_size());
    Ok(out)
}

/// Load a PEM private key.
pub fn load_private_key(path: &Path) -> Result<PKey<Private>, CryptoError> {
    let pem = std::fs::read(path).map_err(|source| CryptoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    PKey::private_key_from_pem(&pem).map_err(|source| CryptoError::PrivateKey {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a PEM X.509 certificate.
pub fn load_certificate(path: &Path) -> Result<X509, CryptoError> {
    let pem = std::fs::read(path).map_err(|source| CryptoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    X509::from_pem(&pem).map_err(|source| CryptoError::Certificate {
        path: path.to_path_buf(),
        source,
    })
}

/// Sign `data` under `signer`/`key` and return the DER-encoded PKCS#7.
///
/// The content is embedded in binary mode unless `detached` is set.
pub fn pkcs7_sign(
    signer: &X509,
    key: &PKey<Private>,
    data: &[u8],
    detached: bool,
) -> Result<Vec<u8>, CryptoError> {
    let flags = if detached {
        Pkcs7Flags::BINARY | Pkcs7Flags::DETACHED
    } else {
        Pkcs7Flags::BINARY
    };
    let extra_certs = Stack::<X509>::new()?;
    let pkcs7 = Pkcs7::sign(signer, key, &extra_certs, data, flags)?;
    Ok(pkcs7.to_der()?)
}

/// Check a DER PKCS#7 against the signer certificate it embeds and return the
/// signed content. The certificate chain is not validated.
///
/// `detached_content` must be supplied for detached signatures.
pub fn pkcs7_content(der: &[u8], detached_content: Option<&[u8]>) -> Result<Vec<u8>, CryptoError> {
    let pkcs7 = Pkcs7::from_der(der)?;
    let certs = Stack::<X509>::new()?;
    let store = X509StoreBuilder::new()?.build();
    let mut out = Vec::new();
    pkcs7.verify(
        &certs,
        &store,
        detached_content,
        Some(&mut out),
        Pkcs7Flags::NOVERIFY | Pkcs7Flags::BINARY,
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_sizes_match_algorithm() {
        for alg in [
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha224,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            assert_eq!(digest(alg, b"abc").unwrap().len(), alg.digest_size());
        }
    }

    #[test]
    fn sha256_known_answer() {
        let out = digest(DigestAlgorithm::Sha256, b"abc").unwrap();
        assert_eq!(
            hex::encode(out),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn none_digest_is_unsupported() {
        assert!(matches!(
            digest(DigestAlgorithm::None, b"abc"),
            Err(CryptoError::UnsupportedDigest(DigestAlgorithm::None))
        ));
        assert!(digest_init(DigestAlgorithm::None).is_err());
        assert!(digest_init(DigestAlgorithm::Sha256).is_ok());
    }

    #[test]
    fn missing_key_reports_open_error() {
        let err = load_private_key(Path::new("/nonexistent/key.pem")).unwrap_err();
        assert!(matches!(err, CryptoError::Open { .. }));
    }

    #[test]
    fn garbage_certificate_reports_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cert.pem");
        std::fs::write(&path, b"not a certificate").unwrap();
        let err = load_certificate(&path).unwrap_err();
        assert!(matches!(err, CryptoError::Certificate { .. }));
    }
}
