//! This library holds the pieces shared by every **vnrip** format decoder.
//!
//! # Decoder framework
//!
//! A decoder answers two questions about a [`File`]: does it recognize the file, and what does the file
//! contain. Two kinds exist:
//!
//! - [`ImageDecoder`]: the file is a single picture, decoded into a [`PixelGrid`]. Palette-indexed
//!   formats additionally take a palette file through [`ImageDecoder::decode_with_palette`].
//! - [`ArchiveDecoder`]: the file is a container. Every resource found is pushed to a [`FileSaver`] as
//!   soon as it is decoded, so callers can persist early results before the whole container is walked.
//!
//! A [`Registry`] holds decoders in registration order. [`Registry::detect`] tries each in turn and
//! returns the first match; a file no decoder recognizes is reported as
//! [`Error::FormatNotRecognized`] rather than producing nothing.
//!
//! # Canonical pixels
//!
//! Decoded images are [`PixelGrid`]s: `width * height` pixels of 8-bit B, G, R, A, row-major from the
//! top-left corner. [`Bgra`] converts the packed encodings most engines use into that layout.
//!

pub mod decoder;
pub mod error;
pub mod file;
pub mod pixel;
pub mod registry;

pub use decoder::{ArchiveDecoder, Decoder, FileSaver, FnSaver, ImageDecoder};
pub use error::{Error, Result};
pub use file::File;
pub use pixel::{Bgra, PixelGrid};
pub use registry::{DecoderKind, Registry};
pub use vnrip_io::ByteStream;
