//! Error types that can be emitted from this library and the decoders built on it

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`vnrip_io::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    StreamError(#[from] vnrip_io::Error),

    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// A structure did not start with the marker it must start with
    #[error("corrupt data at offset {offset:#x}: expected {expected:02x?}, found {found:02x?}")]
    CorruptData {
        /// Where the marker was read from
        offset: u64,
        /// The marker the structure requires
        expected: Vec<u8>,
        /// What was actually there
        found: Vec<u8>,
    },

    /// A recognized container holds a payload encoding that is not implemented
    #[error("unsupported pixel format {code}")]
    UnsupportedFormat {
        /// The raw format selector read from the file
        code: u32,
    },

    /// None of the available decoders recognized the file
    #[error("format of {name} was not recognized")]
    #[diagnostic(help("pass a decoder name explicitly if the file is known to be valid"))]
    FormatNotRecognized {
        /// Name of the rejected file
        name: String,
    },

    /// An offset table points back to an entry that was already read
    #[error("offset table loops back to the entry at {offset:#x}")]
    CyclicTable {
        /// Start of the entry that was visited twice
        offset: u64,
    },

    /// No decoder is registered under this name
    #[error("unknown decoder {0}")]
    UnknownDecoder(String),

    /// The decoder has no palette-indexed mode
    #[error("decoder {0} does not take a palette")]
    PaletteUnsupported(&'static str),

    /// A pixel buffer does not match the dimensions it was paired with
    #[error("pixel buffer holds {actual} bytes, {expected} expected")]
    InvalidPixelBuffer {
        /// Size implied by the dimensions
        expected: usize,
        /// Size of the buffer provided
        actual: usize,
    },

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
