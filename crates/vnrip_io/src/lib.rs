//! This library provides the byte stream every **vnrip** format decoder is built on.
//!
//! A [`ByteStream`] owns a finite buffer and a single cursor. It reads and writes fixed-width integers in
//! either byte order, zero-terminated and fixed-width strings, and lines, and it can temporarily move the
//! cursor elsewhere with [`ByteStream::peek`] to follow an offset without losing its place.
//!
//! All accesses are bounded: anything that would cross the end of the buffer fails with
//! [`Error::OutOfBounds`] instead of returning partial data.
//!

pub mod error;
pub mod stream;

pub use error::{Error, Result};
pub use stream::ByteStream;
