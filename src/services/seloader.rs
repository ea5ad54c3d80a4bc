//! The SELoader reference signaturelet.
//!
//! Produces a DER PKCS#7 signature. For embedded (non-detached) signatures the
//! signed content is a SELoader container: a hash algorithm tag plus a content
//! tag carrying the digest of the input, or a lone content tag carrying the
//! input itself when the content is attached. Detached signatures sign the raw
//! input directly.

use crate::adapters::crypto;
use crate::domain::constants::SELOADER_SIGNATURELET_ID;
use crate::domain::digest::{CipherAlgorithm, DigestAlgorithm};
use crate::domain::flags::SignFlags;
use crate::domain::sel::{SelHashAlgorithm, SelSignatureBuilder};
use crate::domain::suffix::SuffixPattern;
use crate::infra::error::{SigningError, SigningResult};
use crate::services::signaturelet::{Signaturelet, SignatureletDescriptor};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Built-in SELoader signaturelet.
#[derive(Debug, Clone)]
pub struct SeLoader {
    digest_alg: DigestAlgorithm,
}

impl SeLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest_alg: DigestAlgorithm::Sha256,
        }
    }

    #[must_use]
    pub fn with_digest(digest_alg: DigestAlgorithm) -> Self {
        Self { digest_alg }
    }

    /// Build the container that gets signed for embedded signatures.
    pub fn build_container(&self, data: &[u8], flags: SignFlags) -> SigningResult<Vec<u8>> {
        let builder = SelSignatureBuilder::new();
        let builder = if flags.is_content_attached() {
            builder.content(data)
        } else {
            let digest = crypto::digest(self.digest_alg, data)
                .map_err(|e| SigningError::SignatureError(e.to_string()))?;
            log::debug!("Signed content digest: {}", hex::encode(&digest));
            builder
                .hash_algorithm(SelHashAlgorithm::from(self.digest_alg))
                .content(digest)
        };
        builder.finish()
    }
}

impl Default for SeLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Signaturelet for SeLoader {
    fn descriptor(&self) -> SignatureletDescriptor {
        SignatureletDescriptor {
            id: SELOADER_SIGNATURELET_ID.to_string(),
            description: "SELoader PKCS#7 signature".to_string(),
            digest_alg: self.digest_alg,
            cipher_alg: CipherAlgorithm::Rsa,
            detached: true,
            suffix_patterns: vec![
                SuffixPattern::new(SignFlags::DETACHED_SIGNATURE, Some("+.p7s"), None),
                SuffixPattern::new(SignFlags::CONTENT_ATTACHED, Some("+.p7a"), Some("+.p7a")),
            ],
        }
    }

    fn sign(
        &self,
        data: &[u8],
        key: &Path,
        certs: &[PathBuf],
        flags: SignFlags,
    ) -> SigningResult<Vec<u8>> {
        let privkey = crypto::load_private_key(key).map_err(|e| {
            log::error!("Failed to load the private key {}", key.display());
            SigningError::SignatureError(e.to_string())
        })?;

        let x509_certs = certs
            .iter()
            .map(|path| {
                crypto::load_certificate(path).map_err(|e| {
                    log::error!("Failed to load the X.509 certificate {}", path.display());
                    SigningError::SignatureError(e.to_string())
                })
            })
            .collect::<SigningResult<Vec<_>>>()?;

        // Only the first certificate signs; the rest are not chained in.
        let signer = x509_certs.first().ok_or_else(|| {
            SigningError::SignatureError("SELoader requires a signing certificate".to_string())
        })?;

        let detached = flags.is_detached();
        let signed_content: Cow<'_, [u8]> = if detached {
            Cow::Borrowed(data)
        } else {
            Cow::Owned(self.build_container(data, flags)?)
        };

        let signature = crypto::pkcs7_sign(signer, &privkey, &signed_content, detached)
            .map_err(|e| SigningError::SignatureError(e.to_string()))?;

        log::info!(
            "SELoader PKCS#7 signature (signed content {}-byte) generated",
            signed_content.len()
        );
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sel::SelSignature;
    use crate::domain::suffix::{resolve_suffix, validate_suffix_patterns};

    #[test]
    fn descriptor_is_valid() {
        let descriptor = SeLoader::new().descriptor();
        assert_eq!(descriptor.id, "SELoader");
        assert!(descriptor.detached);
        assert!(validate_suffix_patterns(&descriptor.suffix_patterns).is_ok());
    }

    #[test]
    fn default_naming() {
        let patterns = SeLoader::new().descriptor().suffix_patterns;
        assert_eq!(resolve_suffix(&patterns, SignFlags::empty()), Some("+.p7a"));
        assert_eq!(
            resolve_suffix(&patterns, SignFlags::CONTENT_ATTACHED),
            Some("+.p7a")
        );
        assert_eq!(
            resolve_suffix(&patterns, SignFlags::DETACHED_SIGNATURE),
            Some("+.p7s")
        );
    }

    #[test]
    fn digest_container_by_default() {
        let data = b"0123456789";
        let bytes = SeLoader::new()
            .build_container(data, SignFlags::empty())
            .unwrap();
        let sig = SelSignature::parse(&bytes).unwrap();

        assert_eq!(sig.tags().len(), 2);
        assert_eq!(sig.hash_algorithm().unwrap(), Some(SelHashAlgorithm::Sha256));
        let expected = crypto::digest(DigestAlgorithm::Sha256, data).unwrap();
        assert_eq!(sig.content().unwrap(), expected.as_slice());
    }

    #[test]
    fn attached_container_carries_content() {
        let data = b"attached payload";
        let bytes = SeLoader::new()
            .build_container(data, SignFlags::CONTENT_ATTACHED)
            .unwrap();
        let sig = SelSignature::parse(&bytes).unwrap();

        assert_eq!(sig.tags().len(), 1);
        assert_eq!(sig.hash_algorithm().unwrap(), None);
        assert_eq!(sig.content().unwrap(), data);
    }

    #[test]
    fn missing_key_is_a_signature_error() {
        let err = SeLoader::new()
            .sign(
                b"data",
                Path::new("/nonexistent/key.pem"),
                &[],
                SignFlags::empty(),
            )
            .unwrap_err();
        assert!(matches!(err, SigningError::SignatureError(_)));
    }
}
