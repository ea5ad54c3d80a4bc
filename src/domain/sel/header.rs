//! Fixed-size header of the SELoader signature container.

use crate::domain::constants::{
    SEL_SIGNATURE_HEADER_SIZE, SEL_SIGNATURE_MAGIC, SEL_SIGNATURE_REVISION,
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Packed little-endian container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelSignatureHeader {
    pub magic: [u8; 4],
    pub revision: u8,
    pub header_size: u32,
    pub tag_directory_size: u32,
    pub number_of_tag: u32,
    pub payload_size: u32,
    pub flags: u32,
}

impl SelSignatureHeader {
    pub const SIZE: usize = SEL_SIGNATURE_HEADER_SIZE;

    /// Header for the current revision with all size fields filled in.
    #[must_use]
    pub fn new(tag_directory_size: u32, number_of_tag: u32, payload_size: u32) -> Self {
        Self {
            magic: SEL_SIGNATURE_MAGIC,
            revision: SEL_SIGNATURE_REVISION,
            header_size: Self::SIZE as u32,
            tag_directory_size,
            number_of_tag,
            payload_size,
            flags: 0,
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.magic)?;
        w.write_u8(self.revision)?;
        w.write_u32::<LittleEndian>(self.header_size)?;
        w.write_u32::<LittleEndian>(self.tag_directory_size)?;
        w.write_u32::<LittleEndian>(self.number_of_tag)?;
        w.write_u32::<LittleEndian>(self.payload_size)?;
        w.write_u32::<LittleEndian>(self.flags)
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        Ok(Self {
            magic,
            revision: r.read_u8()?,
            header_size: r.read_u32::<LittleEndian>()?,
            tag_directory_size: r.read_u32::<LittleEndian>()?,
            number_of_tag: r.read_u32::<LittleEndian>()?,
            payload_size: r.read_u32::<LittleEndian>()?,
            flags: r.read_u32::<LittleEndian>()?,
        })
    }

    /// Total container size described by this header.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        u64::from(self.header_size)
            + u64::from(self.tag_directory_size)
            + u64::from(self.payload_size)
    }
}
