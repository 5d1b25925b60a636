//! The unit of data passed into and out of decoders
//!

use std::{
    ops::{Deref, DerefMut},
    path::Path,
};

use vnrip_io::ByteStream;

use crate::{error::Result, pixel::PixelGrid};

/// A named blob of bytes, optionally carrying a decoded image
///
/// Input containers are handed to decoders as a `File`, and every resource a decoder extracts comes back
/// out as a `File`. Extracted images keep their [`PixelGrid`] attached so the caller can choose how to
/// encode them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    /// Name of the file, possibly containing directories separated by `/`
    pub name: String,

    /// Raw contents
    pub stream: ByteStream,

    grid: Option<PixelGrid>,
}

impl File {
    pub fn new(name: impl Into<String>, stream: impl Into<ByteStream>) -> Self {
        Self {
            name: name.into(),
            stream: stream.into(),
            grid: None,
        }
    }

    /// Wrap a decoded image as an output file
    pub fn from_grid(name: impl Into<String>, grid: PixelGrid) -> Self {
        Self {
            name: name.into(),
            stream: ByteStream::new(),
            grid: Some(grid),
        }
    }

    /// Read a file from disk, naming it after its path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(Self::new(path.to_string_lossy(), data))
    }

    pub fn grid(&self) -> Option<&PixelGrid> {
        self.grid.as_ref()
    }

    pub fn into_grid(self) -> Option<PixelGrid> {
        self.grid
    }

    pub fn is_image(&self) -> bool {
        self.grid.is_some()
    }

    /// Extension of the last path component, without the dot
    pub fn extension(&self) -> Option<&str> {
        let base = self.name.rsplit(|c: char| c == '/' || c == '\\').next()?;
        match base.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => Some(extension),
            _ => None,
        }
    }

    /// Case-insensitive extension check
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(extension))
    }

    /// Run `f` with the stream cursor at `offset`, restoring the cursor afterwards no matter how `f`
    /// returns.
    ///
    /// This is [`ByteStream::peek`] for callers that need the whole file (its name as well as its
    /// stream) inside the callback.
    pub fn peek<T, E, F>(&mut self, offset: u64, f: F) -> core::result::Result<T, E>
    where
        F: FnOnce(&mut File) -> core::result::Result<T, E>,
        E: From<vnrip_io::Error>,
    {
        let mut guard = FileGuard::new(self);
        guard.stream.seek(offset)?;
        f(&mut guard)
    }
}

struct FileGuard<'a> {
    file: &'a mut File,
    position: u64,
}

impl<'a> FileGuard<'a> {
    fn new(file: &'a mut File) -> Self {
        let position = file.stream.tell();
        Self { file, position }
    }
}

impl Deref for FileGuard<'_> {
    type Target = File;

    fn deref(&self) -> &Self::Target {
        self.file
    }
}

impl DerefMut for FileGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.file
    }
}

impl Drop for FileGuard<'_> {
    fn drop(&mut self) {
        // Only fails if the callback shrank the stream below the saved position
        if self.file.stream.seek(self.position).is_err() {
            let end = self.file.stream.size();
            let _ = self.file.stream.seek(end);
        }
    }
}
