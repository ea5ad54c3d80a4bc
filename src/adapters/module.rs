//! Native signaturelet modules.
//!
//! The only place that touches `libloading`; the unsafe surface is opening a
//! shared object and reading its exported declaration.
//!
//! NOTE: modules share Rust trait objects with the host, so they must be built
//! with the same compiler and the same `libsign` version. The declaration
//! carries the crate version and the loader refuses mismatches.

use crate::domain::constants::SIGNATURELET_DECLARATION_SYMBOL;
use crate::services::signaturelet::SignatureletDeclaration;
use libloading::Library;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to an opened module.
///
/// Cloned into every registry entry the module contributes; the library is
/// closed when the last clone is dropped.
#[derive(Clone)]
pub struct ModuleHandle {
    path: PathBuf,
    library: Arc<Library>,
}

impl ModuleHandle {
    /// Open the shared object at `path`.
    pub fn open(path: &Path) -> Result<Self, libloading::Error> {
        // SAFETY: running a module's initializers is the point of loading it;
        // modules are trusted the same way the install directory is.
        let library = unsafe { Library::new(path)? };
        Ok(Self {
            path: path.to_path_buf(),
            library: Arc::new(library),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the module's exported declaration.
    pub fn declaration(&self) -> Result<SignatureletDeclaration, libloading::Error> {
        // SAFETY: the symbol is a `SignatureletDeclaration` static emitted by
        // `export_signaturelet!`; it lives as long as `self.library`.
        unsafe {
            let symbol = self
                .library
                .get::<*const SignatureletDeclaration>(SIGNATURELET_DECLARATION_SYMBOL)?;
            Ok(symbol.read())
        }
    }

    /// Number of live clones of this handle.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.library)
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleHandle({})", self.path.display())
    }
}
