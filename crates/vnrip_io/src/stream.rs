//! A seekable, bounded byte stream over an owned buffer
//!

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::{
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    ops::{Deref, DerefMut},
};
use tracing::trace;

use crate::error::{Error, Result};

/// Sequential and random access reader/writer over a finite byte buffer.
///
/// Every access is checked against [`ByteStream::size`]. A read or write that would cross the end of
/// the buffer fails with [`Error::OutOfBounds`] and leaves the cursor where it was; nothing is ever
/// silently truncated and writes never grow the buffer (use [`ByteStream::resize`] for that).
///
/// ```
/// # fn doit() -> vnrip_io::Result<()> {
/// use vnrip_io::ByteStream;
///
/// let mut stream = ByteStream::from(b"\x2A\x00\x00\x00name\x00".to_vec());
/// assert_eq!(stream.read_u32_le()?, 42);
///
/// // Read somewhere else without losing our place
/// let name = stream.peek(4, |s| s.read_to_zero())?;
/// assert_eq!(name, b"name");
/// assert_eq!(stream.tell(), 4);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteStream {
    inner: Cursor<Vec<u8>>,
}

impl ByteStream {
    /// Create an empty stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stream of `size` zero bytes, ready to be written to
    pub fn zeroed(size: usize) -> Self {
        Self::from(vec![0u8; size])
    }

    /// Current cursor position
    pub fn tell(&self) -> u64 {
        self.inner.position()
    }

    /// Total size of the stream in bytes
    pub fn size(&self) -> u64 {
        self.inner.get_ref().len() as u64
    }

    /// Whether the cursor sits at the end of the stream
    pub fn eof(&self) -> bool {
        self.tell() == self.size()
    }

    /// Number of bytes between the cursor and the end of the stream
    pub fn remaining(&self) -> u64 {
        self.size().saturating_sub(self.tell())
    }

    /// Move the cursor to an absolute position. Positions past the end are rejected.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.size() {
            return Err(Error::OutOfBounds {
                offset,
                requested: 0,
                size: self.size(),
            });
        }
        self.inner.set_position(offset);
        Ok(())
    }

    /// Move the cursor forward by `count` bytes
    pub fn skip(&mut self, count: u64) -> Result<()> {
        self.ensure(count)?;
        self.inner.set_position(self.tell() + count);
        Ok(())
    }

    /// Grow or shrink the backing buffer. New bytes are zero; the cursor is clamped to the new size.
    pub fn resize(&mut self, size: usize) {
        trace!(from = self.size(), to = size, "resizing stream");
        self.inner.get_mut().resize(size, 0);
        if self.tell() > self.size() {
            self.inner.set_position(self.size());
        }
    }

    /// The whole backing buffer, independent of the cursor
    pub fn as_slice(&self) -> &[u8] {
        self.inner.get_ref()
    }

    /// Unwrap and return the backing buffer
    pub fn into_inner(self) -> Vec<u8> {
        self.inner.into_inner()
    }

    /// Read exactly `count` bytes
    pub fn read(&mut self, count: usize) -> Result<Vec<u8>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        Ok(self.take(count)?.to_vec())
    }

    /// Read everything from the cursor up to the end of the stream
    pub fn read_to_eof(&mut self) -> Result<Vec<u8>> {
        self.read(self.remaining() as usize)
    }

    /// Read bytes up to, and excluding, the next zero byte. The terminator is consumed.
    ///
    /// Fails if the stream ends before a terminator is found.
    pub fn read_to_zero(&mut self) -> Result<Vec<u8>> {
        let start = self.tell() as usize;
        let Some(length) = self.inner.get_ref()[start..].iter().position(|&b| b == 0) else {
            return Err(Error::OutOfBounds {
                offset: self.tell(),
                requested: self.remaining() + 1,
                size: self.size(),
            });
        };

        let value = self.read(length)?;
        self.skip(1)?;
        Ok(value)
    }

    /// Read a fixed window of `count` bytes and cut it at the first zero byte, if there is one.
    ///
    /// The cursor always advances by `count`.
    pub fn read_to_zero_within(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut value = self.read(count)?;
        if let Some(end) = value.iter().position(|&b| b == 0) {
            value.truncate(end);
        }
        Ok(value)
    }

    /// Read a line terminated by `\n` or a zero byte, dropping any `\r`.
    ///
    /// Reaching the end of the stream ends the line as well.
    pub fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        while !self.eof() {
            match self.read_u8()? {
                b'\0' | b'\n' => break,
                b'\r' => {}
                c => line.push(c),
            }
        }
        Ok(line)
    }

    /// Run `f` with the cursor moved to `offset`, then put the cursor back where it was.
    ///
    /// The original position is restored on every exit path, including when `f` fails or panics.
    pub fn peek<T, E, F>(&mut self, offset: u64, f: F) -> core::result::Result<T, E>
    where
        F: FnOnce(&mut ByteStream) -> core::result::Result<T, E>,
        E: From<Error>,
    {
        let mut guard = PositionGuard::new(self);
        trace!(from = guard.position, to = offset, "peeking");
        guard.seek(offset)?;
        f(&mut guard)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.read_u16::<LittleEndian>()
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_u32::<LittleEndian>()
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.read_u64::<LittleEndian>()
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_u16::<BigEndian>()
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.read_u32::<BigEndian>()
    }

    pub fn read_u64_be(&mut self) -> Result<u64> {
        self.read_u64::<BigEndian>()
    }

    /// Read a `u16` in the byte order `E`
    pub fn read_u16<E: ByteOrder>(&mut self) -> Result<u16> {
        Ok(E::read_u16(self.take(2)?))
    }

    /// Read a `u32` in the byte order `E`
    pub fn read_u32<E: ByteOrder>(&mut self) -> Result<u32> {
        Ok(E::read_u32(self.take(4)?))
    }

    /// Read a `u64` in the byte order `E`
    pub fn read_u64<E: ByteOrder>(&mut self) -> Result<u64> {
        Ok(E::read_u64(self.take(8)?))
    }

    /// Write raw bytes at the cursor
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.take_mut(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.take_mut(1)?[0] = value;
        Ok(())
    }

    pub fn write_u16_le(&mut self, value: u16) -> Result<()> {
        self.write_u16::<LittleEndian>(value)
    }

    pub fn write_u32_le(&mut self, value: u32) -> Result<()> {
        self.write_u32::<LittleEndian>(value)
    }

    pub fn write_u64_le(&mut self, value: u64) -> Result<()> {
        self.write_u64::<LittleEndian>(value)
    }

    pub fn write_u16_be(&mut self, value: u16) -> Result<()> {
        self.write_u16::<BigEndian>(value)
    }

    pub fn write_u32_be(&mut self, value: u32) -> Result<()> {
        self.write_u32::<BigEndian>(value)
    }

    pub fn write_u64_be(&mut self, value: u64) -> Result<()> {
        self.write_u64::<BigEndian>(value)
    }

    /// Write a `u16` in the byte order `E`
    pub fn write_u16<E: ByteOrder>(&mut self, value: u16) -> Result<()> {
        E::write_u16(self.take_mut(2)?, value);
        Ok(())
    }

    /// Write a `u32` in the byte order `E`
    pub fn write_u32<E: ByteOrder>(&mut self, value: u32) -> Result<()> {
        E::write_u32(self.take_mut(4)?, value);
        Ok(())
    }

    /// Write a `u64` in the byte order `E`
    pub fn write_u64<E: ByteOrder>(&mut self, value: u64) -> Result<()> {
        E::write_u64(self.take_mut(8)?, value);
        Ok(())
    }

    fn ensure(&self, count: u64) -> Result<()> {
        match self.tell().checked_add(count) {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(Error::OutOfBounds {
                offset: self.tell(),
                requested: count,
                size: self.size(),
            }),
        }
    }

    fn take(&mut self, count: usize) -> Result<&[u8]> {
        self.ensure(count as u64)?;
        let start = self.tell() as usize;
        self.inner.set_position((start + count) as u64);
        Ok(&self.inner.get_ref()[start..start + count])
    }

    fn take_mut(&mut self, count: usize) -> Result<&mut [u8]> {
        self.ensure(count as u64)?;
        let start = self.tell() as usize;
        self.inner.set_position((start + count) as u64);
        Ok(&mut self.inner.get_mut()[start..start + count])
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(value: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(value),
        }
    }
}

impl From<&[u8]> for ByteStream {
    fn from(value: &[u8]) -> Self {
        Self::from(value.to_vec())
    }
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        io::Error::new(io::ErrorKind::UnexpectedEof, value)
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for ByteStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let previous = self.inner.position();
        let target = self.inner.seek(pos)?;
        if target > self.size() {
            self.inner.set_position(previous);
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                Error::OutOfBounds {
                    offset: target,
                    requested: 0,
                    size: self.size(),
                },
            ));
        }
        Ok(target)
    }
}

impl Write for ByteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let count = buf.len().min(self.remaining() as usize);
        self.take_mut(count)?.copy_from_slice(&buf[..count]);
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Restores the cursor of the wrapped stream when dropped
struct PositionGuard<'a> {
    stream: &'a mut ByteStream,
    position: u64,
}

impl<'a> PositionGuard<'a> {
    fn new(stream: &'a mut ByteStream) -> Self {
        let position = stream.tell();
        Self { stream, position }
    }
}

impl Deref for PositionGuard<'_> {
    type Target = ByteStream;

    fn deref(&self) -> &Self::Target {
        self.stream
    }
}

impl DerefMut for PositionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stream
    }
}

impl Drop for PositionGuard<'_> {
    fn drop(&mut self) {
        self.stream.inner.set_position(self.position);
    }
}
