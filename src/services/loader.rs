//! On-demand loading of native signaturelet modules.
//!
//! Discovery probes `<install_dir>/<id>.<ext>` first, then each entry of the
//! colon-separated search path variable as `<dir>/signaturelet/<id>.<ext>`,
//! stopping at the first module that opens and declares itself.

use crate::adapters::module::ModuleHandle;
use crate::domain::constants::{
    MAX_NR_SIGNATURELETS, SIGNATURELET_DIR, SIGNATURELET_EXTENSION, SIGNATURELET_SEARCH_PATH_VAR,
    SIGNATURELET_SUBDIR,
};
use crate::infra::error::{SigningError, SigningResult};
use crate::services::registry::SignatureletRegistry;
use crate::services::signaturelet::{CollectingRegistrar, CORE_VERSION};
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where and how the loader looks for modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub install_dir: PathBuf,
    pub search_path_var: String,
    pub extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from(SIGNATURELET_DIR),
            search_path_var: SIGNATURELET_SEARCH_PATH_VAR.to_string(),
            extension: SIGNATURELET_EXTENSION.to_string(),
        }
    }
}

/// Resolves signaturelet identifiers to modules and registers what they declare.
#[derive(Debug)]
pub struct SignatureletLoader {
    registry: Arc<SignatureletRegistry>,
    config: LoaderConfig,
    handles: Vec<ModuleHandle>,
}

impl SignatureletLoader {
    #[must_use]
    pub fn new(registry: Arc<SignatureletRegistry>, config: LoaderConfig) -> Self {
        Self {
            registry,
            config,
            handles: Vec::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SignatureletRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Module handles opened by this loader and still tracked.
    #[must_use]
    pub fn tracked_handles(&self) -> &[ModuleHandle] {
        &self.handles
    }

    /// Path probed in the install directory.
    #[must_use]
    pub fn install_candidate(&self, id: &str) -> PathBuf {
        self.config
            .install_dir
            .join(format!("{id}.{}", self.config.extension))
    }

    /// Paths probed for `id` from a search path value, in order.
    #[must_use]
    pub fn search_candidates(&self, id: &str, search_path: &OsStr) -> Vec<PathBuf> {
        search_path
            .as_bytes()
            .split(|&b| b == b':')
            .filter(|dir| !dir.is_empty())
            .map(|dir| {
                Path::new(OsStr::from_bytes(dir))
                    .join(SIGNATURELET_SUBDIR)
                    .join(format!("{id}.{}", self.config.extension))
            })
            .collect()
    }

    /// Make sure `id` is registered, loading its module if needed.
    pub fn ensure_loaded(&mut self, id: &str) -> SigningResult<()> {
        if self.registry.contains(id) {
            return Ok(());
        }

        log::debug!("On-demand loading signaturelet {id} ...");

        let install_path = self.install_candidate(id);
        let handle = match self.open_module(&install_path) {
            Some(handle) => handle,
            None => {
                let var = &self.config.search_path_var;
                let Some(search_path) = std::env::var_os(var) else {
                    log::error!("Define ${var}/{SIGNATURELET_SUBDIR} to locate signaturelet {id}");
                    return Err(SigningError::LoadError(format!(
                        "{} not loadable and ${var} is not defined",
                        install_path.display()
                    )));
                };
                self.search_candidates(id, &search_path)
                    .iter()
                    .find_map(|path| {
                        log::debug!(
                            "Attempting to load signaturelet {id}.{} at {} ...",
                            self.config.extension,
                            path.display()
                        );
                        self.open_module(path)
                    })
                    .ok_or_else(|| {
                        SigningError::LoadError(format!(
                            "signaturelet {id} not found in {} or ${var}",
                            install_path.display()
                        ))
                    })?
            }
        };

        self.register_module(&handle)?;
        self.track(handle.clone());

        if !self.registry.contains(id) {
            return Err(SigningError::LoadError(format!(
                "module {} did not register signaturelet {id}",
                handle.path().display()
            )));
        }

        log::debug!("signaturelet {id} loaded from {}", handle.path().display());
        Ok(())
    }

    /// Unregister `id` and drop tracked modules nothing references anymore.
    pub fn unload(&mut self, id: &str) -> SigningResult<()> {
        self.registry.unregister(id)?;
        self.handles.retain(|handle| {
            let in_use = handle.ref_count() > 1;
            if !in_use {
                log::debug!("Closing module {}", handle.path().display());
            }
            in_use
        });
        Ok(())
    }

    fn open_module(&self, path: &Path) -> Option<ModuleHandle> {
        let handle = match ModuleHandle::open(path) {
            Ok(handle) => handle,
            Err(e) => {
                log::debug!("Cannot open {}: {e}", path.display());
                return None;
            }
        };

        match handle.declaration() {
            Ok(declaration) if declaration.core_version == CORE_VERSION => Some(handle),
            Ok(declaration) => {
                log::warn!(
                    "Module {} was built against libsign {} (host is {CORE_VERSION})",
                    path.display(),
                    declaration.core_version
                );
                None
            }
            Err(e) => {
                log::warn!("Module {} has no signaturelet declaration: {e}", path.display());
                None
            }
        }
    }

    fn register_module(&self, handle: &ModuleHandle) -> SigningResult<()> {
        let declaration = handle
            .declaration()
            .map_err(|e| SigningError::LoadError(e.to_string()))?;

        let mut registrar = CollectingRegistrar::default();
        (declaration.register)(&mut registrar);

        for signaturelet in registrar.signaturelets {
            let id = signaturelet.descriptor().id;
            if let Err(e) = self
                .registry
                .register_module(signaturelet, Some(handle.clone()))
            {
                log::warn!(
                    "Module {} failed to register signaturelet {id}: {e}",
                    handle.path().display()
                );
            }
        }
        Ok(())
    }

    fn track(&mut self, handle: ModuleHandle) {
        if self.handles.len() >= MAX_NR_SIGNATURELETS {
            log::warn!(
                "Unable to track the handle for {} (table holds {MAX_NR_SIGNATURELETS})",
                handle.path().display()
            );
            return;
        }
        self.handles.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_in(dir: &Path, var: &str) -> SignatureletLoader {
        SignatureletLoader::new(
            Arc::new(SignatureletRegistry::new()),
            LoaderConfig {
                install_dir: dir.to_path_buf(),
                search_path_var: var.to_string(),
                extension: SIGNATURELET_EXTENSION.to_string(),
            },
        )
    }

    #[test]
    fn candidate_paths_follow_discovery_order() {
        let loader = loader_in(Path::new("/usr/lib/libsign/signaturelet"), "UNUSED");
        assert_eq!(
            loader.install_candidate("SELoader"),
            PathBuf::from("/usr/lib/libsign/signaturelet/SELoader.siglet")
        );
        assert_eq!(
            loader.search_candidates("SELoader", OsStr::new("/opt/a::/opt/b")),
            vec![
                PathBuf::from("/opt/a/signaturelet/SELoader.siglet"),
                PathBuf::from("/opt/b/signaturelet/SELoader.siglet"),
            ]
        );
    }

    #[test]
    fn search_path_keeps_non_utf8_directories() {
        let loader = loader_in(Path::new("/nonexistent"), "UNUSED");
        let search_path = OsStr::from_bytes(b"/opt/mod\xffules:/opt/b");
        let candidates = loader.search_candidates("Custom", search_path);

        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].as_os_str().as_bytes(),
            b"/opt/mod\xffules/signaturelet/Custom.siglet"
        );
        assert_eq!(
            candidates[1],
            PathBuf::from("/opt/b/signaturelet/Custom.siglet")
        );
    }

    #[test]
    fn registered_signaturelet_needs_no_load() {
        let registry = Arc::new(SignatureletRegistry::with_builtins().unwrap());
        let mut loader = SignatureletLoader::new(
            registry,
            LoaderConfig {
                install_dir: PathBuf::from("/nonexistent"),
                search_path_var: "LIBSIGN_TEST_UNDEFINED_PATH_0".to_string(),
                extension: SIGNATURELET_EXTENSION.to_string(),
            },
        );
        loader.ensure_loaded("SELoader").unwrap();
        assert!(loader.tracked_handles().is_empty());
    }

    #[test]
    fn unknown_signaturelet_without_search_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut loader = loader_in(dir.path(), "LIBSIGN_TEST_UNDEFINED_PATH_1");

        let err = loader.ensure_loaded("Unknown").unwrap_err();
        assert!(matches!(err, SigningError::LoadError(_)));
        assert!(loader.registry().is_empty());
        assert!(loader.tracked_handles().is_empty());
    }

    #[test]
    fn unload_of_unknown_signaturelet_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut loader = loader_in(dir.path(), "LIBSIGN_TEST_UNDEFINED_PATH_2");
        assert!(matches!(
            loader.unload("Unknown"),
            Err(SigningError::NotFound(_))
        ));
    }
}
