//! Tag directory records of the SELoader signature container.

use crate::domain::constants::{SEL_HASH_ALGORITHM_PAYLOAD_SIZE, SEL_SIGNATURE_TAG_SIZE};
use crate::domain::digest::DigestAlgorithm;
use crate::infra::error::{SigningError, SigningResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Semantic field named by a tag record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelTagKind {
    HashAlgorithm,
    SignatureAlgorithm,
    Signature,
    Content,
    CreationTime,
    FileName,
    FileSize,
    /// Tag id this revision does not know about; kept so parsing is lossless.
    Other(u32),
}

impl SelTagKind {
    #[must_use]
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => SelTagKind::HashAlgorithm,
            2 => SelTagKind::SignatureAlgorithm,
            3 => SelTagKind::Signature,
            9 => SelTagKind::Content,
            10 => SelTagKind::CreationTime,
            11 => SelTagKind::FileName,
            12 => SelTagKind::FileSize,
            other => SelTagKind::Other(other),
        }
    }

    #[must_use]
    pub fn as_u32(self) -> u32 {
        match self {
            SelTagKind::HashAlgorithm => 1,
            SelTagKind::SignatureAlgorithm => 2,
            SelTagKind::Signature => 3,
            SelTagKind::Content => 9,
            SelTagKind::CreationTime => 10,
            SelTagKind::FileName => 11,
            SelTagKind::FileSize => 12,
            SelTagKind::Other(value) => value,
        }
    }
}

/// Hash algorithm identifiers as stored in the hash algorithm tag payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SelHashAlgorithm {
    None = 0,
    Sha1 = 1,
    Sha224 = 2,
    Sha256 = 3,
    Sha384 = 4,
    Sha512 = 5,
}

impl SelHashAlgorithm {
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(SelHashAlgorithm::None),
            1 => Some(SelHashAlgorithm::Sha1),
            2 => Some(SelHashAlgorithm::Sha224),
            3 => Some(SelHashAlgorithm::Sha256),
            4 => Some(SelHashAlgorithm::Sha384),
            5 => Some(SelHashAlgorithm::Sha512),
            _ => None,
        }
    }

    /// Fixed-size payload record for the hash algorithm tag.
    #[must_use]
    pub fn to_payload(self) -> [u8; SEL_HASH_ALGORITHM_PAYLOAD_SIZE] {
        (self as u32).to_le_bytes()
    }

    pub fn from_payload(payload: &[u8]) -> SigningResult<Self> {
        let raw: [u8; SEL_HASH_ALGORITHM_PAYLOAD_SIZE] = payload.try_into().map_err(|_| {
            SigningError::ContainerError(format!(
                "hash algorithm payload must be {SEL_HASH_ALGORITHM_PAYLOAD_SIZE} bytes, got {}",
                payload.len()
            ))
        })?;
        let value = u32::from_le_bytes(raw);
        Self::from_u32(value).ok_or_else(|| {
            SigningError::ContainerError(format!("unknown hash algorithm identifier {value}"))
        })
    }
}

impl From<DigestAlgorithm> for SelHashAlgorithm {
    fn from(alg: DigestAlgorithm) -> Self {
        match alg {
            DigestAlgorithm::None => SelHashAlgorithm::None,
            DigestAlgorithm::Sha1 => SelHashAlgorithm::Sha1,
            DigestAlgorithm::Sha224 => SelHashAlgorithm::Sha224,
            DigestAlgorithm::Sha256 => SelHashAlgorithm::Sha256,
            DigestAlgorithm::Sha384 => SelHashAlgorithm::Sha384,
            DigestAlgorithm::Sha512 => SelHashAlgorithm::Sha512,
        }
    }
}

/// One packed tag directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelSignatureTag {
    pub tag: SelTagKind,
    pub revision: u8,
    pub reserved: u8,
    pub flags: u16,
    pub data_offset: u32,
    pub data_size: u32,
}

impl SelSignatureTag {
    pub const SIZE: usize = SEL_SIGNATURE_TAG_SIZE;

    /// Exclusive end of the referenced payload range.
    #[must_use]
    pub fn data_end(&self) -> u64 {
        u64::from(self.data_offset) + u64::from(self.data_size)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<LittleEndian>(self.tag.as_u32())?;
        w.write_u8(self.revision)?;
        w.write_u8(self.reserved)?;
        w.write_u16::<LittleEndian>(self.flags)?;
        w.write_u32::<LittleEndian>(self.data_offset)?;
        w.write_u32::<LittleEndian>(self.data_size)
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            tag: SelTagKind::from_u32(r.read_u32::<LittleEndian>()?),
            revision: r.read_u8()?,
            reserved: r.read_u8()?,
            flags: r.read_u16::<LittleEndian>()?,
            data_offset: r.read_u32::<LittleEndian>()?,
            data_size: r.read_u32::<LittleEndian>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_ids_match_format() {
        assert_eq!(SelTagKind::HashAlgorithm.as_u32(), 1);
        assert_eq!(SelTagKind::Content.as_u32(), 9);
        assert_eq!(SelTagKind::from_u32(12), SelTagKind::FileSize);
        assert_eq!(SelTagKind::from_u32(77), SelTagKind::Other(77));
    }

    #[test]
    fn tag_record_is_packed() {
        let tag = SelSignatureTag {
            tag: SelTagKind::Content,
            revision: 1,
            reserved: 0,
            flags: 0x0102,
            data_offset: 4,
            data_size: 32,
        };
        let mut buf = Vec::new();
        tag.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), SelSignatureTag::SIZE);
        assert_eq!(&buf[..4], &[9, 0, 0, 0]);
        assert_eq!(&buf[6..8], &[0x02, 0x01]);
        assert_eq!(tag.data_end(), 36);
    }

    #[test]
    fn hash_algorithm_payload() {
        let payload = SelHashAlgorithm::from(DigestAlgorithm::Sha256).to_payload();
        assert_eq!(payload, [3, 0, 0, 0]);
        assert_eq!(
            SelHashAlgorithm::from_payload(&payload).unwrap(),
            SelHashAlgorithm::Sha256
        );
        assert!(SelHashAlgorithm::from_payload(&[3, 0]).is_err());
        assert!(SelHashAlgorithm::from_payload(&[9, 0, 0, 0]).is_err());
    }
}
