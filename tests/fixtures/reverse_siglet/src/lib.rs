//! Signaturelet module used by the module loading tests.
//!
//! The module registers one signaturelet named after the file it was loaded
//! from (`Reverse.siglet` registers `Reverse`). Its signature is the input
//! reversed.

use libsign::{
    CipherAlgorithm, DigestAlgorithm, SignFlags, Signaturelet, SignatureletDescriptor,
    SignatureletRegistrar, SigningResult, SuffixPattern,
};
use std::path::{Path, PathBuf};

struct Reverse {
    id: String,
}

impl Signaturelet for Reverse {
    fn descriptor(&self) -> SignatureletDescriptor {
        SignatureletDescriptor {
            id: self.id.clone(),
            description: "reversing test module".to_string(),
            digest_alg: DigestAlgorithm::Sha256,
            cipher_alg: CipherAlgorithm::Rsa,
            detached: true,
            suffix_patterns: vec![SuffixPattern::new(
                SignFlags::DETACHED_SIGNATURE,
                Some("+.rev"),
                Some("+.rev"),
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
        Ok(data.iter().rev().copied().collect())
    }
}

/// File stem of the shared object this code was mapped from.
fn module_stem() -> Option<String> {
    let addr = module_stem as usize;
    let maps = std::fs::read("/proc/self/maps").ok()?;
    let maps = String::from_utf8_lossy(&maps);

    maps.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let (start, end) = fields.next()?.split_once('-')?;
        let start = usize::from_str_radix(start, 16).ok()?;
        let end = usize::from_str_radix(end, 16).ok()?;
        if !(start..end).contains(&addr) {
            return None;
        }
        let path = fields.nth(4)?;
        Path::new(path).file_stem()?.to_str().map(str::to_owned)
    })
}

fn register(registrar: &mut dyn SignatureletRegistrar) {
    if let Some(id) = module_stem() {
        registrar.register(Box::new(Reverse { id }));
    }
}

#[cfg(not(feature = "stale-core"))]
libsign::export_signaturelet!(register);

#[cfg(feature = "stale-core")]
#[no_mangle]
#[allow(non_upper_case_globals)]
pub static signaturelet_declaration: libsign::services::SignatureletDeclaration =
    libsign::services::SignatureletDeclaration {
        core_version: "0.0.0-stale",
        register,
    };
