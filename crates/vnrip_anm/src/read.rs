//! Types for reading ANM archives
//!

use binrw::BinRead;
use bon::Builder;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};
use vnrip_fmt::{
    ArchiveDecoder, ByteStream, Decoder, Error, File, FileSaver, ImageDecoder, PixelGrid, Result,
};

use crate::types::{Table, TableEntry, TextureFormat, TextureHeader, TEXTURE_MAGIC};

/// What to do when a single texture fails to decode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop unpacking and return the error
    #[default]
    Abort,

    /// Log the error and continue with the next entry
    Skip,
}

/// Options for unpacking ANM archives
///
/// Errors in the entry table itself always abort, whatever the policy.
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct AnmOptions {
    /// How failing textures are handled
    #[builder(default)]
    pub error_policy: ErrorPolicy,
}

/// Resolve a relative offset against the start of the entry holding it.
///
/// Archives are addressed with 32 bit offsets, so the sum wraps like it does in the engine.
fn resolve(start: u64, relative: u32) -> u64 {
    (start as u32).wrapping_add(relative) as u64
}

fn read_name(stream: &mut ByteStream, offset: u64) -> Result<String> {
    let raw = stream.peek(offset, |s| s.read_to_zero())?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// The fixed part of an entry: its header and the names it points at
struct EntryHeader {
    entry: TableEntry,
    sprite_count: u32,
    script_count: u32,
    next_offset: u64,
}

/// Read the header of the entry at `start`, leaving the stream at its sprite offset list
fn read_entry_header(stream: &mut ByteStream, start: u64) -> Result<EntryHeader> {
    stream.seek(start)?;
    let sprite_count = stream.read_u32_le()?;
    let script_count = stream.read_u32_le()?;
    stream.skip(4)?;

    let width = stream.read_u32_le()?;
    let height = stream.read_u32_le()?;
    let format = stream.read_u32_le()?;
    stream.skip(4)?;

    let name_offset1 = resolve(start, stream.read_u32_le()?);
    stream.skip(4)?;
    let name_offset2 = resolve(start, stream.read_u32_le()?);
    let name1 = read_name(stream, name_offset1)?;
    let name2 = read_name(stream, name_offset2)?;

    let version = stream.read_u32_le()?;
    stream.skip(4)?;
    let texture_offset = resolve(start, stream.read_u32_le()?);
    let has_data = stream.read_u32_le()? != 0;

    let next_offset = resolve(start, stream.read_u32_le()?);
    stream.skip(4)?;

    let entry = TableEntry {
        start_offset: start,
        width,
        height,
        format,
        name1,
        name2,
        version,
        texture_offset: has_data.then_some(texture_offset),
        sprite_offsets: Vec::new(),
        script_offsets: Vec::new(),
    };

    Ok(EntryHeader {
        entry,
        sprite_count,
        script_count,
        next_offset,
    })
}

/// Read the entry starting at `start`, returning it along with the start of the next entry
fn read_entry(stream: &mut ByteStream, start: u64) -> Result<(TableEntry, u64)> {
    let EntryHeader {
        mut entry,
        sprite_count,
        script_count,
        next_offset,
    } = read_entry_header(stream, start)?;

    entry.sprite_offsets = (0..sprite_count)
        .map(|_| Ok(resolve(start, stream.read_u32_le()?)))
        .collect::<Result<Vec<_>>>()?;
    entry.script_offsets = (0..script_count)
        .map(|_| Ok(resolve(start, stream.read_u32_le()?)))
        .collect::<Result<Vec<_>>>()?;

    Ok((entry, next_offset))
}

/// Walk the linked entries of an archive, starting at offset 0.
///
/// The table ends at the first entry whose next offset points back at itself. A link back to any
/// earlier entry fails with [`Error::CyclicTable`].
#[instrument(skip_all, err)]
pub fn read_table(stream: &mut ByteStream) -> Result<Table> {
    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    let mut start = 0;

    loop {
        visited.insert(start);
        let (entry, next) = read_entry(stream, start)?;
        debug!(
            start,
            name = %entry.name1,
            has_data = entry.has_data(),
            "read entry"
        );
        entries.push(entry);

        if next == start {
            break;
        }
        if visited.contains(&next) {
            return Err(Error::CyclicTable { offset: next });
        }
        start = next;
    }

    Ok(Table::new(entries))
}

/// Read and check the texture record header at `offset`, leaving the stream at the pixel data
pub fn read_texture_header(stream: &mut ByteStream, offset: u64) -> Result<TextureHeader> {
    stream.seek(offset)?;
    let found = stream.read(TEXTURE_MAGIC.len())?;
    if found != TEXTURE_MAGIC {
        return Err(Error::CorruptData {
            offset,
            expected: TEXTURE_MAGIC.to_vec(),
            found,
        });
    }

    Ok(TextureHeader::read(stream)?)
}

/// Decode the pixel data following `header`
fn read_pixels(stream: &mut ByteStream, header: &TextureHeader) -> Result<PixelGrid> {
    let format = TextureFormat::try_from(header.format)?;
    let bytes_per_pixel = format.bytes_per_pixel();
    let raw = stream.read(header.pixel_count() * bytes_per_pixel)?;

    let mut grid = PixelGrid::new(header.width as u32, header.height as u32);
    for (pixel, word) in grid.pixels_mut().zip(raw.chunks_exact(bytes_per_pixel)) {
        pixel.copy_from_slice(&format.decode(word).to_bytes());
    }

    Ok(grid)
}

/// Decode the texture attached to `entry` into an image named after it.
///
/// Entries without a texture give `None` and their texture offset is never followed.
#[instrument(skip_all, fields(name = %entry.name1), err)]
pub fn read_texture(stream: &mut ByteStream, entry: &TableEntry) -> Result<Option<File>> {
    let Some(offset) = entry.texture_offset else {
        return Ok(None);
    };

    let header = read_texture_header(stream, offset)?;
    debug!(
        format = header.format,
        width = header.width,
        height = header.height,
        "decoding texture"
    );
    let grid = read_pixels(stream, &header)?;

    Ok(Some(File::from_grid(entry.name1.clone(), grid)))
}

/// ANM archive decoder
///
/// ```no_run
/// use vnrip_anm::{AnmArchive, AnmOptions, ErrorPolicy};
/// use vnrip_fmt::{ArchiveDecoder, File};
///
/// fn extract(path: &str) -> vnrip_fmt::Result<Vec<File>> {
///     let anm = AnmArchive::new(AnmOptions::builder().error_policy(ErrorPolicy::Skip).build());
///     let mut input = File::open(path)?;
///     let mut output = Vec::new();
///     anm.unpack(&mut input, &mut output)?;
///     Ok(output)
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AnmArchive {
    options: AnmOptions,
}

impl AnmArchive {
    pub fn new(options: AnmOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnmOptions {
        &self.options
    }
}

impl Decoder for AnmArchive {
    fn name(&self) -> &'static str {
        "anm"
    }

    /// Only the first header and its names are read; the offset lists are left to [`read_table`].
    fn is_recognized_internal(&self, file: &mut File) -> Result<bool> {
        let EntryHeader { entry, .. } = read_entry_header(&mut file.stream, 0)?;

        if let Some(offset) = entry.texture_offset {
            let magic = file.stream.peek(offset, |s| s.read(TEXTURE_MAGIC.len()));
            if magic.is_ok_and(|m| m == TEXTURE_MAGIC) {
                return Ok(true);
            }
        }

        Ok(file.has_extension("anm"))
    }
}

impl ArchiveDecoder for AnmArchive {
    #[instrument(skip_all, fields(file = %file.name), err)]
    fn unpack(&self, file: &mut File, saver: &mut dyn FileSaver) -> Result<()> {
        let table = read_table(&mut file.stream)?;
        debug!("{} entries", table.len());

        for entry in &table {
            match read_texture(&mut file.stream, entry) {
                Ok(Some(texture)) => saver.save(texture)?,
                Ok(None) => debug!(name = %entry.name1, "entry has no texture"),
                Err(e) if self.options.error_policy == ErrorPolicy::Skip => {
                    warn!(name = %entry.name1, "skipping texture: {e}")
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

/// Decoder for a bare texture record, as found at an entry's texture offset
#[derive(Debug, Clone, Copy, Default)]
pub struct ThtxImageDecoder;

impl Decoder for ThtxImageDecoder {
    fn name(&self) -> &'static str {
        "thtx"
    }

    fn is_recognized_internal(&self, file: &mut File) -> Result<bool> {
        Ok(file.stream.read(TEXTURE_MAGIC.len())? == TEXTURE_MAGIC)
    }
}

impl ImageDecoder for ThtxImageDecoder {
    #[instrument(skip_all, fields(file = %file.name), err)]
    fn decode(&self, file: &mut File) -> Result<PixelGrid> {
        let header = read_texture_header(&mut file.stream, 0)?;
        read_pixels(&mut file.stream, &header)
    }
}
