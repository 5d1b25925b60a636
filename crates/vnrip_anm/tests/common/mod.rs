//! Builds synthetic ANM archives

#![allow(dead_code)]

use vnrip_fmt::ByteStream;
use vnrip_anm::types::{ENTRY_HEADER_SIZE, TEXTURE_MAGIC};

/// Where an entry's next offset points
#[derive(Debug, Clone, Copy)]
pub enum Link {
    /// The entry written after this one, or itself for the last entry
    Following,
    /// The entry at this index
    Entry(usize),
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub magic: [u8; 4],
    pub format: u16,
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

impl Texture {
    pub fn new(format: u16, width: u16, height: u16, data: Vec<u8>) -> Self {
        Self {
            magic: *TEXTURE_MAGIC,
            format,
            width,
            height,
            data,
        }
    }

    /// A 1x1 texture holding one 16 bit word
    pub fn word16(format: u16, word: u16) -> Self {
        Self::new(format, 1, 1, word.to_le_bytes().to_vec())
    }

    /// A 1x1 texture holding one 32 bit word
    pub fn word32(word: u32) -> Self {
        Self::new(1, 1, 1, word.to_le_bytes().to_vec())
    }

    pub fn with_magic(mut self, magic: &[u8; 4]) -> Self {
        self.magic = *magic;
        self
    }

    fn size(&self) -> u64 {
        16 + self.data.len() as u64
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub name1: String,
    pub name2: String,
    pub version: u32,
    pub sprites: Vec<u32>,
    pub scripts: Vec<u32>,
    pub texture: Option<Texture>,
    pub link: Link,
}

impl Entry {
    pub fn new(name: &str) -> Self {
        Self {
            name1: name.into(),
            name2: String::new(),
            version: 0,
            sprites: vec![],
            scripts: vec![],
            texture: None,
            link: Link::Following,
        }
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_alpha(mut self, name: &str) -> Self {
        self.name2 = name.into();
        self
    }

    pub fn with_sprites(mut self, sprites: &[u32]) -> Self {
        self.sprites = sprites.to_vec();
        self
    }

    pub fn with_scripts(mut self, scripts: &[u32]) -> Self {
        self.scripts = scripts.to_vec();
        self
    }

    pub fn linked_to(mut self, index: usize) -> Self {
        self.link = Link::Entry(index);
        self
    }

    fn offsets_size(&self) -> u64 {
        4 * (self.sprites.len() + self.scripts.len()) as u64
    }

    fn names_size(&self) -> u64 {
        (self.name1.len() + 1 + self.name2.len() + 1) as u64
    }

    fn size(&self) -> u64 {
        ENTRY_HEADER_SIZE
            + self.offsets_size()
            + self.names_size()
            + self.texture.as_ref().map_or(0, Texture::size)
    }
}

/// Relative offset from `start` to `target`, wrapping like the reader does
fn relative(start: u64, target: u64) -> u32 {
    (target as u32).wrapping_sub(start as u32)
}

/// Lay the entries out back to back: header, offsets, names, texture record
pub fn build(entries: &[Entry]) -> Vec<u8> {
    let mut starts = Vec::with_capacity(entries.len());
    let mut total = 0;
    for entry in entries {
        starts.push(total);
        total += entry.size();
    }

    let mut stream = ByteStream::zeroed(total as usize);
    for (index, entry) in entries.iter().enumerate() {
        let start = starts[index];
        let name1 = ENTRY_HEADER_SIZE + entry.offsets_size();
        let name2 = name1 + entry.name1.len() as u64 + 1;
        let texture = name1 + entry.names_size();
        let next = match entry.link {
            Link::Following => starts.get(index + 1).copied().unwrap_or(start),
            Link::Entry(target) => starts[target],
        };

        let (width, height, format) = entry
            .texture
            .as_ref()
            .map_or((0, 0, 0), |t| (t.width as u32, t.height as u32, t.format as u32));

        stream.seek(start).unwrap();
        stream.write_u32_le(entry.sprites.len() as u32).unwrap();
        stream.write_u32_le(entry.scripts.len() as u32).unwrap();
        stream.write_u32_le(0).unwrap();
        stream.write_u32_le(width).unwrap();
        stream.write_u32_le(height).unwrap();
        stream.write_u32_le(format).unwrap();
        stream.write_u32_le(0).unwrap();
        stream.write_u32_le(name1 as u32).unwrap();
        stream.write_u32_le(0).unwrap();
        stream.write_u32_le(name2 as u32).unwrap();
        stream.write_u32_le(entry.version).unwrap();
        stream.write_u32_le(0).unwrap();
        match entry.texture {
            Some(_) => {
                stream.write_u32_le(texture as u32).unwrap();
                stream.write_u32_le(1).unwrap();
            }
            None => {
                // Points far outside the archive
                stream.write_u32_le(0x7fff_0000).unwrap();
                stream.write_u32_le(0).unwrap();
            }
        }
        stream.write_u32_le(relative(start, next)).unwrap();
        stream.write_u32_le(0).unwrap();

        for offset in entry.sprites.iter().chain(&entry.scripts) {
            stream.write_u32_le(*offset).unwrap();
        }

        stream.write(entry.name1.as_bytes()).unwrap();
        stream.write_u8(0).unwrap();
        stream.write(entry.name2.as_bytes()).unwrap();
        stream.write_u8(0).unwrap();

        if let Some(texture) = &entry.texture {
            stream.write(&texture.magic).unwrap();
            stream.write_u16_le(0).unwrap();
            stream.write_u16_le(texture.format).unwrap();
            stream.write_u16_le(texture.width).unwrap();
            stream.write_u16_le(texture.height).unwrap();
            stream.write_u32_le(texture.data.len() as u32).unwrap();
            stream.write(&texture.data).unwrap();
        }
    }

    stream.into_inner()
}

/// Start offset of each entry as laid out by [`build`]
pub fn starts(entries: &[Entry]) -> Vec<u64> {
    entries
        .iter()
        .scan(0, |offset, entry| {
            let start = *offset;
            *offset += entry.size();
            Some(start)
        })
        .collect()
}
