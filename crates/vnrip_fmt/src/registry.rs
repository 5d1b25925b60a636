//! Ordered collection of decoders and the dispatch built on it
//!

use indexmap::IndexMap;
use std::fmt::{self, Debug};
use tracing::{debug, instrument, warn};

use crate::{
    decoder::{ArchiveDecoder, FileSaver, ImageDecoder},
    error::{Error, Result},
    file::File,
};

/// A registered decoder of either kind
pub enum DecoderKind {
    Image(Box<dyn ImageDecoder>),
    Archive(Box<dyn ArchiveDecoder>),
}

impl DecoderKind {
    pub fn name(&self) -> &'static str {
        match self {
            DecoderKind::Image(d) => d.name(),
            DecoderKind::Archive(d) => d.name(),
        }
    }

    pub fn is_recognized(&self, file: &mut File) -> bool {
        match self {
            DecoderKind::Image(d) => d.is_recognized(file),
            DecoderKind::Archive(d) => d.is_recognized(file),
        }
    }

    /// Decode `file` and hand the results to `saver`.
    ///
    /// Image decoders produce one file named after the input; archive decoders stream their entries.
    #[instrument(skip_all, fields(decoder = self.name(), file = %file.name), err)]
    pub fn unpack(&self, file: &mut File, saver: &mut dyn FileSaver) -> Result<()> {
        match self {
            DecoderKind::Image(d) => {
                let grid = d.decode(file)?;
                saver.save(File::from_grid(file.name.clone(), grid))
            }
            DecoderKind::Archive(d) => d.unpack(file, saver),
        }
    }
}

impl Debug for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecoderKind::Image(d) => write!(f, "Image({})", d.name()),
            DecoderKind::Archive(d) => write!(f, "Archive({})", d.name()),
        }
    }
}

/// Decoders tried in the order they were registered
///
/// ```no_run
/// use vnrip_fmt::{File, Registry};
///
/// fn extract(registry: &Registry, path: &str) -> vnrip_fmt::Result<Vec<File>> {
///     let mut file = File::open(path)?;
///     let mut output = Vec::new();
///     registry.unpack(&mut file, &mut output)?;
///     Ok(output)
/// }
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    decoders: IndexMap<&'static str, DecoderKind>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image decoder, chaining
    pub fn with_image(mut self, decoder: impl ImageDecoder + 'static) -> Self {
        self.register_image(decoder);
        self
    }

    /// Add an archive decoder, chaining
    pub fn with_archive(mut self, decoder: impl ArchiveDecoder + 'static) -> Self {
        self.register_archive(decoder);
        self
    }

    pub fn register_image(&mut self, decoder: impl ImageDecoder + 'static) {
        self.insert(DecoderKind::Image(Box::new(decoder)));
    }

    pub fn register_archive(&mut self, decoder: impl ArchiveDecoder + 'static) {
        self.insert(DecoderKind::Archive(Box::new(decoder)));
    }

    /// Registering a name again replaces that decoder in place, keeping its original detection order
    fn insert(&mut self, decoder: DecoderKind) {
        let name = decoder.name();
        if self.decoders.insert(name, decoder).is_some() {
            warn!("decoder {name} registered twice, replacing it at its original position");
        }
    }

    /// Number of registered decoders
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether no decoder has been registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the registered decoders in detection order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }

    /// Look a decoder up by name
    pub fn by_name(&self, name: &str) -> Result<&DecoderKind> {
        self.decoders
            .get(name)
            .ok_or_else(|| Error::UnknownDecoder(name.to_owned()))
    }

    /// First decoder, in registration order, that recognizes `file`
    #[instrument(skip_all, fields(file = %file.name))]
    pub fn detect(&self, file: &mut File) -> Result<&DecoderKind> {
        for decoder in self.decoders.values() {
            if decoder.is_recognized(file) {
                debug!("recognized as {}", decoder.name());
                return Ok(decoder);
            }
        }

        Err(Error::FormatNotRecognized {
            name: file.name.clone(),
        })
    }

    /// Detect the format of `file` and unpack it into `saver`
    pub fn unpack(&self, file: &mut File, saver: &mut dyn FileSaver) -> Result<()> {
        self.detect(file)?.unpack(file, saver)
    }
}
