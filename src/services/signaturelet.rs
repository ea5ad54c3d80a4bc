//! The signaturelet plugin interface.
//!
//! A signaturelet produces one kind of signature under a unique identifier.
//! Built-in signaturelets are registered directly; native modules export a
//! [`SignatureletDeclaration`] with [`export_signaturelet!`](crate::export_signaturelet)
//! and hand their signaturelets to a [`SignatureletRegistrar`] when loaded.

use crate::domain::digest::{CipherAlgorithm, DigestAlgorithm};
use crate::domain::flags::SignFlags;
use crate::domain::suffix::SuffixPattern;
use crate::infra::error::SigningResult;
use std::path::{Path, PathBuf};

/// Version a module must have been built against.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Static metadata of a signaturelet, validated at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureletDescriptor {
    pub id: String,
    pub description: String,
    pub digest_alg: DigestAlgorithm,
    pub cipher_alg: CipherAlgorithm,
    /// Whether detached signatures can be produced.
    pub detached: bool,
    /// Output naming rules, evaluated first match first.
    pub suffix_patterns: Vec<SuffixPattern>,
}

/// A pluggable signature producer.
pub trait Signaturelet: Send + Sync {
    fn descriptor(&self) -> SignatureletDescriptor;

    /// Sign `data` with the PEM key at `key` and the certificates in `certs`.
    fn sign(
        &self,
        data: &[u8],
        key: &Path,
        certs: &[PathBuf],
        flags: SignFlags,
    ) -> SigningResult<Vec<u8>>;
}

/// Sink a module registers its signaturelets into.
pub trait SignatureletRegistrar {
    fn register(&mut self, signaturelet: Box<dyn Signaturelet>);
}

/// Exported by every native module under `signaturelet_declaration`.
#[derive(Clone, Copy)]
pub struct SignatureletDeclaration {
    pub core_version: &'static str,
    pub register: fn(&mut dyn SignatureletRegistrar),
}

/// Declare the registration hook of a native signaturelet module.
///
/// ```ignore
/// fn register(registrar: &mut dyn SignatureletRegistrar) {
///     registrar.register(Box::new(MySignaturelet));
/// }
/// libsign::export_signaturelet!(register);
/// ```
#[macro_export]
macro_rules! export_signaturelet {
    ($register:expr) => {
        #[doc(hidden)]
        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static signaturelet_declaration: $crate::services::signaturelet::SignatureletDeclaration =
            $crate::services::signaturelet::SignatureletDeclaration {
                core_version: $crate::services::signaturelet::CORE_VERSION,
                register: $register,
            };
    };
}

/// Registrar collecting everything a module registers, in order.
#[derive(Default)]
pub(crate) struct CollectingRegistrar {
    pub(crate) signaturelets: Vec<Box<dyn Signaturelet>>,
}

impl SignatureletRegistrar for CollectingRegistrar {
    fn register(&mut self, signaturelet: Box<dyn Signaturelet>) {
        self.signaturelets.push(signaturelet);
    }
}
