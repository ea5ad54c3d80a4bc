//! Parsing of SELoader signature containers.

use super::header::SelSignatureHeader;
use super::tag::{SelHashAlgorithm, SelSignatureTag, SelTagKind};
use crate::domain::constants::{SEL_SIGNATURE_MAGIC, SEL_SIGNATURE_REVISION};
use crate::infra::error::{SigningError, SigningResult};
use std::io::Cursor;

/// A parsed container borrowing the buffer it was read from.
#[derive(Debug, Clone)]
pub struct SelSignature<'a> {
    header: SelSignatureHeader,
    tags: Vec<SelSignatureTag>,
    payload: &'a [u8],
}

impl<'a> SelSignature<'a> {
    /// Parse and bounds-check a container.
    pub fn parse(bytes: &'a [u8]) -> SigningResult<Self> {
        let mut cursor = Cursor::new(bytes);
        let header = SelSignatureHeader::read_from(&mut cursor)
            .map_err(|e| SigningError::ContainerError(format!("truncated header: {e}")))?;

        if header.magic != SEL_SIGNATURE_MAGIC {
            return Err(SigningError::ContainerError(format!(
                "bad magic {}",
                hex::encode(header.magic)
            )));
        }
        if header.revision != SEL_SIGNATURE_REVISION {
            return Err(SigningError::ContainerError(format!(
                "unsupported revision {}",
                header.revision
            )));
        }
        if header.header_size as usize != SelSignatureHeader::SIZE {
            return Err(SigningError::ContainerError(format!(
                "unexpected header size {}",
                header.header_size
            )));
        }
        let expected_directory = u64::from(header.number_of_tag) * SelSignatureTag::SIZE as u64;
        if u64::from(header.tag_directory_size) != expected_directory {
            return Err(SigningError::ContainerError(format!(
                "tag directory size {} does not match {} tags",
                header.tag_directory_size, header.number_of_tag
            )));
        }
        if header.total_size() != bytes.len() as u64 {
            return Err(SigningError::ContainerError(format!(
                "container is {} bytes but header describes {}",
                bytes.len(),
                header.total_size()
            )));
        }

        let mut tags = Vec::with_capacity(header.number_of_tag as usize);
        for index in 0..header.number_of_tag {
            let tag = SelSignatureTag::read_from(&mut cursor).map_err(|e| {
                SigningError::ContainerError(format!("truncated tag {index}: {e}"))
            })?;
            if tag.data_end() > u64::from(header.payload_size) {
                return Err(SigningError::ContainerError(format!(
                    "tag {index} ({:?}) range {}+{} exceeds payload size {}",
                    tag.tag, tag.data_offset, tag.data_size, header.payload_size
                )));
            }
            tags.push(tag);
        }

        let payload_start = SelSignatureHeader::SIZE + header.tag_directory_size as usize;
        Ok(Self {
            header,
            tags,
            payload: &bytes[payload_start..],
        })
    }

    #[must_use]
    pub fn header(&self) -> &SelSignatureHeader {
        &self.header
    }

    #[must_use]
    pub fn tags(&self) -> &[SelSignatureTag] {
        &self.tags
    }

    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Payload bytes of a tag record from this container.
    #[must_use]
    pub fn data(&self, tag: &SelSignatureTag) -> &'a [u8] {
        let start = tag.data_offset as usize;
        &self.payload[start..start + tag.data_size as usize]
    }

    /// Payload of the first tag of `kind`.
    #[must_use]
    pub fn find(&self, kind: SelTagKind) -> Option<&'a [u8]> {
        self.tags
            .iter()
            .find(|t| t.tag == kind)
            .map(|t| self.data(t))
    }

    #[must_use]
    pub fn content(&self) -> Option<&'a [u8]> {
        self.find(SelTagKind::Content)
    }

    /// Hash algorithm declared by the container, if it carries a digest.
    pub fn hash_algorithm(&self) -> SigningResult<Option<SelHashAlgorithm>> {
        self.find(SelTagKind::HashAlgorithm)
            .map(SelHashAlgorithm::from_payload)
            .transpose()
    }
}
