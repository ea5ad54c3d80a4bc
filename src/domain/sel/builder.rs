//! Assembles a SELoader signature container.
//!
//! Tags are accumulated together with their payload bytes and every offset
//! and size is computed once in [`SelSignatureBuilder::finish`], so each tag's
//! range always lies inside the payload area.

use super::header::SelSignatureHeader;
use super::tag::{SelHashAlgorithm, SelSignatureTag, SelTagKind};
use crate::domain::constants::SEL_SIGNATURE_TAG_REVISION;
use crate::infra::error::{SigningError, SigningResult};

#[derive(Debug, Clone)]
struct PendingTag {
    tag: SelTagKind,
    flags: u16,
    payload: Vec<u8>,
}

/// Builder for the tagged container format.
#[derive(Debug, Clone, Default)]
pub struct SelSignatureBuilder {
    tags: Vec<PendingTag>,
}

impl SelSignatureBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag in emission order.
    #[must_use]
    pub fn tag(mut self, tag: SelTagKind, payload: impl Into<Vec<u8>>) -> Self {
        self.tags.push(PendingTag {
            tag,
            flags: 0,
            payload: payload.into(),
        });
        self
    }

    #[must_use]
    pub fn hash_algorithm(self, alg: SelHashAlgorithm) -> Self {
        self.tag(SelTagKind::HashAlgorithm, alg.to_payload())
    }

    #[must_use]
    pub fn content(self, content: impl Into<Vec<u8>>) -> Self {
        self.tag(SelTagKind::Content, content)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Lay out header, tag directory and payload into one buffer.
    pub fn finish(self) -> SigningResult<Vec<u8>> {
        let hash_pos = self
            .tags
            .iter()
            .position(|t| t.tag == SelTagKind::HashAlgorithm);
        let content_pos = self.tags.iter().position(|t| t.tag == SelTagKind::Content);
        if let (Some(hash), Some(content)) = (hash_pos, content_pos) {
            if hash > content {
                return Err(SigningError::ContainerError(
                    "hash algorithm tag must precede the content tag".to_string(),
                ));
            }
        }

        let number_of_tag = to_u32(self.tags.len(), "tag count")?;
        let tag_directory_size = to_u32(self.tags.len() * SelSignatureTag::SIZE, "tag directory")?;

        let mut directory = Vec::with_capacity(self.tags.len());
        let mut payload_size: u32 = 0;
        for pending in &self.tags {
            let data_size = to_u32(pending.payload.len(), "tag payload")?;
            directory.push(SelSignatureTag {
                tag: pending.tag,
                revision: SEL_SIGNATURE_TAG_REVISION,
                reserved: 0,
                flags: pending.flags,
                data_offset: payload_size,
                data_size,
            });
            payload_size = payload_size.checked_add(data_size).ok_or_else(|| {
                SigningError::ContainerError("payload exceeds 4 GiB".to_string())
            })?;
        }

        let header = SelSignatureHeader::new(tag_directory_size, number_of_tag, payload_size);
        let mut out = Vec::with_capacity(
            SelSignatureHeader::SIZE + tag_directory_size as usize + payload_size as usize,
        );
        header.write_to(&mut out)?;
        for tag in &directory {
            tag.write_to(&mut out)?;
        }
        for pending in &self.tags {
            out.extend_from_slice(&pending.payload);
        }

        log::debug!(
            "SELoader container: {} tags, {}-byte payload, {} bytes total",
            number_of_tag,
            payload_size,
            out.len()
        );
        Ok(out)
    }
}

fn to_u32(value: usize, what: &str) -> SigningResult<u32> {
    u32::try_from(value)
        .map_err(|_| SigningError::ContainerError(format!("{what} too large: {value}")))
}
