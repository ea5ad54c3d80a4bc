//! Centralized constants for request limits, plugin discovery and the
//! SELoader signature container.
//! Keep this intentionally small; only broadly reused literals should live here.

// === Signing request limits ===

/// Maximum number of files signed by one request; excess entries are dropped.
pub const MAX_NR_REQUEST: usize = 256;

/// Maximum number of certificates accepted by one request.
pub const MAX_NR_CERT: usize = 16;

// === Signaturelet discovery ===

/// Default install directory probed first by the loader.
pub const SIGNATURELET_DIR: &str = "/usr/lib/libsign/signaturelet";

/// Subdirectory appended to each search path entry.
pub const SIGNATURELET_SUBDIR: &str = "signaturelet";

/// File extension of signaturelet modules.
pub const SIGNATURELET_EXTENSION: &str = "siglet";

/// Environment variable holding the colon-separated search path.
pub const SIGNATURELET_SEARCH_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Capacity of the loader's module handle table.
pub const MAX_NR_SIGNATURELETS: usize = 16;

/// Symbol exported by every signaturelet module.
pub const SIGNATURELET_DECLARATION_SYMBOL: &[u8] = b"signaturelet_declaration\0";

// === SELoader signature container ===

/// Container magic as it appears on disk.
pub const SEL_SIGNATURE_MAGIC: [u8; 4] = *b"SELS";

/// Current container revision.
pub const SEL_SIGNATURE_REVISION: u8 = 1;

/// Packed header size: magic, revision and five u32 fields.
pub const SEL_SIGNATURE_HEADER_SIZE: usize = 4 + 1 + 4 * 5;

/// Packed tag record size.
pub const SEL_SIGNATURE_TAG_SIZE: usize = 4 + 1 + 1 + 2 + 4 + 4;

/// Revision stamped on emitted tags; revision 0 is reserved for "current".
pub const SEL_SIGNATURE_TAG_REVISION: u8 = 1;

/// Size of the hash algorithm tag payload.
pub const SEL_HASH_ALGORITHM_PAYLOAD_SIZE: usize = 4;

// === Default key material ===

pub const SELSIGN_KEY: &str = "/etc/keys/SEL_privkey.pem";
pub const SELSIGN_CERT: &str = "/etc/keys/SEL_x509.pem";
pub const SELSIGN_CA_CERT: &str = "/etc/keys/SEL_ca_x509.pem";

/// Identifier of the built-in reference signaturelet.
pub const SELOADER_SIGNATURELET_ID: &str = "SELoader";
