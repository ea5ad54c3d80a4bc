//! Domain types for signing requests, signaturelet metadata and the
//! SELoader container format. Nothing in here touches the filesystem or
//! the crypto backend.

pub mod constants;
pub mod digest;
pub mod flags;
pub mod request;
pub mod sel;
pub mod suffix;
