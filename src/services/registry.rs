//! Registry of signaturelets keyed by identifier.
//!
//! Entries keep insertion order and lookups return the first match. The entry
//! list sits behind a mutex so a registry can be shared between the loader and
//! the signing pipeline; registration, unregistration and signing each hold the
//! lock for their whole duration.

use crate::adapters::crypto;
use crate::adapters::module::ModuleHandle;
use crate::domain::flags::SignFlags;
use crate::domain::suffix::{resolve_suffix, validate_suffix_patterns, SuffixRule};
use crate::infra::error::{SigningError, SigningResult};
use crate::services::seloader::SeLoader;
use crate::services::signaturelet::{Signaturelet, SignatureletDescriptor};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

struct RegistryEntry {
    descriptor: SignatureletDescriptor,
    // Field order matters: the signaturelet's code may live in `handle`.
    signaturelet: Box<dyn Signaturelet>,
    handle: Option<ModuleHandle>,
}

/// Lock-guarded collection of registered signaturelets, shared through `Arc`
/// by the loader and every workflow built on it.
#[derive(Default)]
pub struct SignatureletRegistry {
    entries: Mutex<Vec<RegistryEntry>>,
}

impl SignatureletRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in signaturelets already registered.
    pub fn with_builtins() -> SigningResult<Self> {
        let registry = Self::new();
        registry.register(Box::new(SeLoader::new()))?;
        Ok(registry)
    }

    fn entries(&self) -> MutexGuard<'_, Vec<RegistryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and append a signaturelet.
    pub fn register(&self, signaturelet: Box<dyn Signaturelet>) -> SigningResult<()> {
        self.register_module(signaturelet, None)
    }

    /// Validate and append a signaturelet contributed by a loaded module.
    pub(crate) fn register_module(
        &self,
        signaturelet: Box<dyn Signaturelet>,
        handle: Option<ModuleHandle>,
    ) -> SigningResult<()> {
        let descriptor = signaturelet.descriptor();
        log::debug!("Registering signaturelet {} ...", descriptor.id);

        sanity_check(&descriptor)?;

        let mut entries = self.entries();
        if entries.iter().any(|e| e.descriptor.id == descriptor.id) {
            return Err(SigningError::AlreadyRegistered(descriptor.id));
        }

        crypto::digest_init(descriptor.digest_alg)?;

        log::info!("signaturelet {} registered", descriptor.id);
        entries.push(RegistryEntry {
            descriptor,
            signaturelet,
            handle,
        });
        Ok(())
    }

    /// Remove a signaturelet; its module is closed once no entry uses it.
    pub fn unregister(&self, id: &str) -> SigningResult<()> {
        log::debug!("Unregistering signaturelet {id} ...");

        let mut entries = self.entries();
        let Some(index) = entries.iter().position(|e| e.descriptor.id == id) else {
            log::error!("Unregistering a not existing signaturelet {id}");
            return Err(SigningError::NotFound(id.to_string()));
        };
        let entry = entries.remove(index);
        drop(entries);

        if let Some(handle) = &entry.handle {
            log::debug!("Releasing module {} for {id}", handle.path().display());
        }
        Ok(())
    }

    /// Descriptor of the first entry registered under `id`.
    pub fn lookup(&self, id: &str) -> SigningResult<SignatureletDescriptor> {
        self.entries()
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| e.descriptor.clone())
            .ok_or_else(|| SigningError::NotFound(id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries().iter().any(|e| e.descriptor.id == id)
    }

    /// Registered identifiers in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|e| e.descriptor.id.clone())
            .collect()
    }

    #[must_use]
    pub fn descriptors(&self) -> Vec<SignatureletDescriptor> {
        self.entries().iter().map(|e| e.descriptor.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Output suffix for `flags`, first matching pattern wins.
    pub fn resolve_suffix(&self, id: &str, flags: SignFlags) -> SigningResult<SuffixRule> {
        let descriptor = self.lookup(id)?;
        let suffix = resolve_suffix(&descriptor.suffix_patterns, flags).ok_or_else(|| {
            SigningError::NoMatchingPattern {
                id: id.to_string(),
                flags,
            }
        })?;
        // Patterns were validated at registration, so this cannot fail in practice.
        Ok(SuffixRule::parse(suffix)?)
    }

    /// Delegate to the signaturelet's own `sign`.
    pub fn sign(
        &self,
        id: &str,
        data: &[u8],
        key: &Path,
        certs: &[PathBuf],
        flags: SignFlags,
    ) -> SigningResult<Vec<u8>> {
        let entries = self.entries();
        let Some(entry) = entries.iter().find(|e| e.descriptor.id == id) else {
            log::error!("Failed to search the signaturelet {id}");
            return Err(SigningError::NotFound(id.to_string()));
        };
        entry.signaturelet.sign(data, key, certs, flags)
    }
}

impl fmt::Debug for SignatureletRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureletRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

fn sanity_check(descriptor: &SignatureletDescriptor) -> SigningResult<()> {
    if descriptor.id.is_empty() {
        return Err(SigningError::InvalidDescriptor(
            "signaturelet must have a valid id".to_string(),
        ));
    }

    if !descriptor.digest_alg.is_supported() {
        return Err(SigningError::InvalidDescriptor(format!(
            "Unsupported digest algorithm {} specified by signaturelet {}",
            descriptor.digest_alg, descriptor.id
        )));
    }

    validate_suffix_patterns(&descriptor.suffix_patterns).map_err(|e| {
        SigningError::InvalidDescriptor(format!("signaturelet {}: {e}", descriptor.id))
    })
}
