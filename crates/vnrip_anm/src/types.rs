//! Base types for structure of ANM file.

use binrw::{BinRead, BinWrite};
use byteorder::{ByteOrder, LittleEndian};
use derive_more::derive::{Constructor, Deref, IntoIterator};
use vnrip_fmt::{Bgra, Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Marker every texture record starts with
pub const TEXTURE_MAGIC: &[u8; 4] = b"THTX";

/// Size of the fixed part of an entry header, before the sprite and script offsets
pub const ENTRY_HEADER_SIZE: u64 = 64;

/// One record of the entry table
///
/// All offsets are absolute positions in the archive. The relative offsets stored in the file have
/// already been resolved against [`TableEntry::start_offset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableEntry {
    /// Where the entry header starts
    pub start_offset: u64,

    /// Texture dimensions as declared by the entry
    pub width: u32,
    pub height: u32,

    /// Pixel format selector as declared by the entry
    ///
    /// Decoding uses the selector of the texture record instead.
    pub format: u32,

    /// Name of the texture, used to name the extracted image
    pub name1: String,

    /// Name of the alpha mask texture; often empty
    pub name2: String,

    pub version: u32,

    /// Start of the texture record, if the entry carries one
    pub texture_offset: Option<u64>,

    /// Sprite definitions, kept opaque
    pub sprite_offsets: Vec<u64>,

    /// Animation scripts, kept opaque
    pub script_offsets: Vec<u64>,
}

impl TableEntry {
    /// Whether a texture record is attached to this entry
    pub fn has_data(&self) -> bool {
        self.texture_offset.is_some()
    }
}

/// Every entry of an archive in the order they are linked
#[derive(Constructor, Clone, Debug, Default, PartialEq, Eq, Deref, IntoIterator)]
#[into_iterator(owned, ref)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table(Vec<TableEntry>);

/// Texture record header, read right after the [`TEXTURE_MAGIC`]
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[brw(little)]
pub struct TextureHeader {
    /// Pixel format selector, see [`TextureFormat`]
    #[brw(pad_before = 2)]
    pub format: u16,

    pub width: u16,
    pub height: u16,

    /// Size of the pixel data as declared; not trusted when decoding
    pub data_size: u32,
}

impl TextureHeader {
    /// Size of the record header including the magic
    pub const SIZE: u64 = 16;

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Pixel encodings a texture record may use
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextureFormat {
    /// 32 bit words, blue in the lowest byte
    Bgra8888 = 1,

    /// 16 bit words, 5 bits blue, 6 bits green, 5 bits red
    Bgr565 = 3,

    /// 16 bit words, 4 bits per channel, blue lowest
    Bgra4444 = 5,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Bgra8888 => 4,
            TextureFormat::Bgr565 | TextureFormat::Bgra4444 => 2,
        }
    }

    /// Decode one pixel from exactly [`TextureFormat::bytes_per_pixel`] bytes
    pub fn decode(self, raw: &[u8]) -> Bgra {
        match self {
            TextureFormat::Bgra8888 => Bgra::from_bgra8888(LittleEndian::read_u32(raw)),
            TextureFormat::Bgr565 => Bgra::from_bgr565(LittleEndian::read_u16(raw)),
            TextureFormat::Bgra4444 => Bgra::from_bgra4444(LittleEndian::read_u16(raw)),
        }
    }
}

impl TryFrom<u16> for TextureFormat {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            1 => Ok(TextureFormat::Bgra8888),
            3 => Ok(TextureFormat::Bgr565),
            5 => Ok(TextureFormat::Bgra4444),
            code => Err(Error::UnsupportedFormat { code: code as u32 }),
        }
    }
}
