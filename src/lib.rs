//! libsign
//!
//! Batch signing of build artifacts through pluggable signature producers
//! ("signaturelets") chosen at runtime by identifier. Ships the SELoader
//! signaturelet, which wraps a tagged SELoader container in a PKCS#7
//! signature.
//!
//! ```no_run
//! use libsign::{SignFlags, SignWorkflow, SigningRequest};
//!
//! # fn main() -> libsign::SigningResult<()> {
//! let mut workflow = SignWorkflow::with_builtins(Default::default())?;
//! let request = SigningRequest::new("SELoader", "/etc/keys/SEL_privkey.pem")
//!     .with_signed_files(["bzImage"])
//!     .with_certs(["/etc/keys/SEL_x509.pem"])
//!     .with_flags(SignFlags::DETACHED_SIGNATURE);
//! let outcome = workflow.sign(&request)?;
//! assert_eq!(outcome.outputs[0].output.to_str(), Some("bzImage.p7s"));
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

// Re-export infra modules at crate root for convenience
pub use infra::{config, error};

pub use domain::digest::{CipherAlgorithm, DigestAlgorithm};
pub use domain::flags::SignFlags;
pub use domain::request::{SigningContext, SigningRequest};
pub use domain::sel::{SelSignature, SelSignatureBuilder};
pub use domain::suffix::{SuffixPattern, SuffixRule};
pub use infra::error::{SigningError, SigningResult};
pub use pipelines::sign::{SignWorkflow, SigningOutcome};
pub use services::{
    LoaderConfig, SeLoader, Signaturelet, SignatureletDescriptor, SignatureletLoader,
    SignatureletRegistrar, SignatureletRegistry,
};
