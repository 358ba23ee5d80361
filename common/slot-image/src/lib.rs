// Licensed under the Apache-2.0 license
#![cfg_attr(target_os = "none", no_std)]

use core::fmt;

use zerocopy::byteorder::{LittleEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Magic number at offset 0 of every bootable image, stored little-endian.
pub const IMAGE_MAGIC: u32 = 0x96F3_B83D;

/// On-flash byte sequence of [`IMAGE_MAGIC`].
pub const IMAGE_MAGIC_BYTES: [u8; IMAGE_MAGIC_LEN] = IMAGE_MAGIC.to_le_bytes();

pub const IMAGE_MAGIC_LEN: usize = core::mem::size_of::<u32>();
pub const IMAGE_HEADER_LEN: usize = core::mem::size_of::<ImageHeader>();

/// Returns true iff `bytes` starts with the image magic.
pub fn has_image_magic(bytes: &[u8]) -> bool {
    bytes.len() >= IMAGE_MAGIC_LEN && bytes[..IMAGE_MAGIC_LEN] == IMAGE_MAGIC_BYTES
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct ImageVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: U16<LittleEndian>,
    pub build_num: U32<LittleEndian>,
}

impl ImageVersion {
    pub fn new(major: u8, minor: u8, revision: u16, build_num: u32) -> Self {
        Self {
            major,
            minor,
            revision: U16::new(revision),
            build_num: U32::new(build_num),
        }
    }
}

impl fmt::Display for ImageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}+{}",
            self.major,
            self.minor,
            self.revision.get(),
            self.build_num.get()
        )
    }
}

/// Fixed 32-byte header placed in front of an image in a slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct ImageHeader {
    pub magic: U32<LittleEndian>,
    pub load_addr: U32<LittleEndian>,
    pub hdr_size: U16<LittleEndian>,
    pub protect_tlv_size: U16<LittleEndian>,
    pub img_size: U32<LittleEndian>,
    pub flags: U32<LittleEndian>,
    pub version: ImageVersion,
    pub pad: U32<LittleEndian>,
}

impl ImageHeader {
    /// Parses a header from the start of `bytes`; `None` if fewer than 32 bytes.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        Self::read_from_prefix(bytes).ok().map(|(header, _)| header)
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic.get() == IMAGE_MAGIC
    }

    /// Structural checks only; there is no signature over the image.
    pub fn verify(&self) -> bool {
        if !self.has_valid_magic() {
            return false;
        }
        if (self.hdr_size.get() as usize) < IMAGE_HEADER_LEN {
            return false;
        }
        self.img_size.get() != 0
    }

    /// Bytes the image occupies in its slot, header and protected TLVs included.
    pub fn total_size(&self) -> u32 {
        self.hdr_size.get() as u32 + self.img_size.get() + self.protect_tlv_size.get() as u32
    }
}
