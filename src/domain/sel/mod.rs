//! SELoader tagged signature container.
//!
//! Layout (packed, little-endian):
//! - header: magic `"SELS"`, revision, header size, tag directory size,
//!   tag count, payload size, flags
//! - tag directory: one fixed-size record per tag, in emission order, each
//!   pointing at an offset/length inside the payload area
//! - payload: the tag payloads concatenated in the same order

mod builder;
mod header;
mod parse;
mod tag;

pub use builder::SelSignatureBuilder;
pub use header::SelSignatureHeader;
pub use parse::SelSignature;
pub use tag::{SelHashAlgorithm, SelSignatureTag, SelTagKind};
