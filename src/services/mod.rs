//! Service layer module root.
//! Contains the signaturelet interface, the registry, the on-demand loader
//! and the built-in SELoader signaturelet.

pub mod loader;
pub mod registry;
pub mod seloader;
pub mod signaturelet;

pub use loader::{LoaderConfig, SignatureletLoader};
pub use registry::SignatureletRegistry;
pub use seloader::SeLoader;
pub use signaturelet::{
    Signaturelet, SignatureletDeclaration, SignatureletDescriptor, SignatureletRegistrar,
    CORE_VERSION,
};
