//! This library extracts textures from **ANM** archives used by *Touhou 06 - The Embodiment of Scarlet
//! Devil* and other games by *Team Shanghai Alice*.
//!
//! # ANM Archive Format Documentation
//!
//! An ANM file bundles the textures of a set of sprites together with the sprite rectangles and the
//! scripts animating them. There is no file header; the file is a linked list of entries starting at
//! offset 0. Files are typically identified with the `.anm` extension.
//!
//! ## Entry
//!
//! Each entry starts with a fixed 64 byte header. Every offset in it is **relative to the start of the
//! entry**, not to the start of the file.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Sprite Count           | 4 bytes: Number of sprite offsets after the header         |
//! | 0x0004         | Script Count           | 4 bytes: Number of script offsets after the sprite offsets |
//! | 0x0008         | Reserved               | 4 bytes                                                    |
//! | 0x000C         | Width                  | 4 bytes: Declared texture width                            |
//! | 0x0010         | Height                 | 4 bytes: Declared texture height                           |
//! | 0x0014         | Format                 | 4 bytes: Declared pixel format                             |
//! | 0x0018         | Reserved               | 4 bytes                                                    |
//! | 0x001C         | Name Offset            | 4 bytes: Zero terminated texture name                      |
//! | 0x0020         | Reserved               | 4 bytes                                                    |
//! | 0x0024         | Alpha Name Offset      | 4 bytes: Zero terminated alpha mask name                   |
//! | 0x0028         | Version                | 4 bytes                                                    |
//! | 0x002C         | Reserved               | 4 bytes                                                    |
//! | 0x0030         | Texture Offset         | 4 bytes: Start of the texture record                       |
//! | 0x0034         | Has Data               | 4 bytes: Nonzero when a texture record is present          |
//! | 0x0038         | Next Offset            | 4 bytes: Start of the next entry                           |
//! | 0x003C         | Reserved               | 4 bytes                                                    |
//!
//! The header is followed by `sprite count` and then `script count` 4 byte relative offsets. This
//! crate keeps them but does not interpret what they point at.
//!
//! The last entry is the one whose **Next Offset** is zero, i.e. points back at itself.
//!
//! ## Texture Record
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "THTX"                                            |
//! | 0x0004         | Reserved               | 2 bytes                                                    |
//! | 0x0006         | Format                 | 2 bytes: Pixel format of the data                          |
//! | 0x0008         | Width                  | 2 bytes: Width in pixels                                   |
//! | 0x000A         | Height                 | 2 bytes: Height in pixels                                  |
//! | 0x000C         | Data Size              | 4 bytes: Size of the pixel data                            |
//!
//! Pixel data follows row-major from the top-left corner. Known formats:
//!
//! - `1`: 32 bits, 8:8:8:8 B, G, R, A from the lowest byte up
//! - `3`: 16 bits, 5:6:5 B, G, R from the lowest bit up, always opaque
//! - `5`: 16 bits, 4:4:4:4 B, G, R, A from the lowest bit up
//!
//! ## Additional Information
//!
//! - **File Extension**: `.anm`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Offsets**: 32 bit; adding a relative offset wraps around at 4 GiB
//!

pub mod read;
pub mod types;

pub use read::{
    read_table, read_texture, read_texture_header, AnmArchive, AnmOptions, ErrorPolicy,
    ThtxImageDecoder,
};
pub use types::{Table, TableEntry, TextureFormat, TextureHeader};
pub use vnrip_fmt::{Error, Result};
