//! Adapter layer modules for external system integration.
//!
//! Provides adapters for:
//! - OpenSSL key/certificate loading, digests and PKCS#7 signing
//! - Native signaturelet modules opened at runtime

pub mod crypto;
pub mod module;
