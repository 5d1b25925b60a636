//! Capability traits implemented by every format decoder
//!

use tracing::trace;

use crate::{
    error::{Error, Result},
    file::File,
    pixel::PixelGrid,
};

/// Common surface of every decoder: a name and a recognition check
pub trait Decoder {
    /// Short, unique name used to pick the decoder explicitly
    fn name(&self) -> &'static str;

    /// Check whether `file` looks like this decoder's format.
    ///
    /// Called with the stream positioned at offset 0. The cursor does not need to be restored, and any
    /// error is treated as "not recognized".
    fn is_recognized_internal(&self, file: &mut File) -> Result<bool>;

    /// Check whether `file` looks like this decoder's format, leaving its stream cursor untouched
    fn is_recognized(&self, file: &mut File) -> bool {
        match file.peek(0, |file| self.is_recognized_internal(file)) {
            Ok(recognized) => recognized,
            Err(e) => {
                trace!(decoder = self.name(), file = %file.name, "recognition failed: {e}");
                false
            }
        }
    }
}

/// A decoder producing a single image
pub trait ImageDecoder: Decoder {
    /// Decode `file` into a canonical image
    fn decode(&self, file: &mut File) -> Result<PixelGrid>;

    /// Decode a palette-indexed `file` using the colors stored in `palette`
    fn decode_with_palette(&self, file: &mut File, palette: &mut File) -> Result<PixelGrid> {
        let _ = (file, palette);
        Err(Error::PaletteUnsupported(self.name()))
    }
}

/// A decoder producing any number of files out of a container
pub trait ArchiveDecoder: Decoder {
    /// Extract every resource of `file`, handing each to `saver` as soon as it is decoded
    fn unpack(&self, file: &mut File, saver: &mut dyn FileSaver) -> Result<()>;
}

/// Destination for files produced by a decoder
pub trait FileSaver {
    fn save(&mut self, file: File) -> Result<()>;
}

/// Collects everything in memory
impl FileSaver for Vec<File> {
    fn save(&mut self, file: File) -> Result<()> {
        self.push(file);
        Ok(())
    }
}

/// Adapts a closure into a [`FileSaver`]
///
/// ```
/// use vnrip_fmt::{File, FileSaver, FnSaver};
///
/// let mut names = Vec::new();
/// let mut saver = FnSaver(|file: File| -> vnrip_fmt::Result<()> {
///     names.push(file.name);
///     Ok(())
/// });
/// saver.save(File::new("a.png", b"".to_vec())).unwrap();
/// drop(saver);
/// assert_eq!(names, vec!["a.png"]);
/// ```
pub struct FnSaver<F>(pub F);

impl<F> FileSaver for FnSaver<F>
where
    F: FnMut(File) -> Result<()>,
{
    fn save(&mut self, file: File) -> Result<()> {
        (self.0)(file)
    }
}
