//! Shared integration test helpers.
//!
//! Key material is generated per test into a `TempDir` so no fixture keys are
//! checked in.

#![allow(dead_code)]

use libsign::{
    CipherAlgorithm, DigestAlgorithm, LoaderConfig, SignFlags, Signaturelet,
    SignatureletDescriptor, SigningError, SigningResult, SuffixPattern,
};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::{X509Builder, X509NameBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Throwaway signing material on disk.
pub struct TestKeys {
    pub dir: TempDir,
    pub key: PathBuf,
    pub cert: PathBuf,
}

/// Generate an RSA-2048 key and a matching self-signed certificate.
pub fn generate_keys() -> TestKeys {
    let dir = TempDir::new().unwrap();

    let rsa = Rsa::generate(2048).unwrap();
    let pkey = PKey::from_rsa(rsa).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "libsign test signer").unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();
    builder.set_pubkey(&pkey).unwrap();
    builder.sign(&pkey, MessageDigest::sha256()).unwrap();
    let cert = builder.build();

    let key_path = dir.path().join("SEL_privkey.pem");
    let cert_path = dir.path().join("SEL_x509.pem");
    fs::write(&key_path, pkey.private_key_to_pem_pkcs8().unwrap()).unwrap();
    fs::write(&cert_path, cert.to_pem().unwrap()).unwrap();

    TestKeys {
        dir,
        key: key_path,
        cert: cert_path,
    }
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

/// Loader settings that can never find a module on disk.
pub fn isolated_loader_config(dir: &Path, var: &str) -> LoaderConfig {
    LoaderConfig {
        install_dir: dir.join("no-such-install-dir"),
        search_path_var: var.to_string(),
        ..LoaderConfig::default()
    }
}

/// Deterministic signaturelet: the signature is `SIG:` plus the reversed input.
/// Inputs starting with `FAIL` cannot be signed.
pub struct Echo {
    id: String,
}

impl Echo {
    pub fn boxed(id: &str) -> Box<dyn Signaturelet> {
        Box::new(Self { id: id.to_string() })
    }

    pub fn expected(data: &[u8]) -> Vec<u8> {
        b"SIG:".iter().chain(data.iter().rev()).copied().collect()
    }
}

impl Signaturelet for Echo {
    fn descriptor(&self) -> SignatureletDescriptor {
        SignatureletDescriptor {
            id: self.id.clone(),
            description: "echo test signaturelet".to_string(),
            digest_alg: DigestAlgorithm::Sha256,
            cipher_alg: CipherAlgorithm::Rsa,
            detached: true,
            suffix_patterns: vec![SuffixPattern::new(
                SignFlags::DETACHED_SIGNATURE,
                Some("+.sig"),
                Some("+.sig"),
            )],
        }
    }

    fn sign(
        &self,
        data: &[u8],
        _key: &Path,
        _certs: &[PathBuf],
        _flags: SignFlags,
    ) -> SigningResult<Vec<u8>> {
        if data.starts_with(b"FAIL") {
            return Err(SigningError::SignatureError("refusing to sign".to_string()));
        }
        Ok(Self::expected(data))
    }
}
