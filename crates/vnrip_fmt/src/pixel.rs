//! Canonical in-memory image model
//!
//! Every source pixel encoding is normalized into a [`PixelGrid`]: 8 bits per channel, four channels,
//! stored row-major in B, G, R, A byte order.

use std::slice::{ChunksExact, ChunksExactMut};

use crate::error::{Error, Result};

/// A single pixel in canonical channel order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bgra {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Bgra {
    pub const fn new(b: u8, g: u8, r: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// 8:8:8:8 word, blue in the lowest byte
    pub const fn from_bgra8888(word: u32) -> Self {
        let [b, g, r, a] = word.to_le_bytes();
        Self { b, g, r, a }
    }

    /// 5:6:5 word, blue in the lowest bits; alpha is always opaque
    pub const fn from_bgr565(word: u16) -> Self {
        Self {
            b: expand5(word & 0x1f),
            g: expand6((word >> 5) & 0x3f),
            r: expand5((word >> 11) & 0x1f),
            a: 0xff,
        }
    }

    /// 4:4:4:4 word, blue in the lowest bits
    pub const fn from_bgra4444(word: u16) -> Self {
        Self {
            b: expand4(word & 0xf),
            g: expand4((word >> 4) & 0xf),
            r: expand4((word >> 8) & 0xf),
            a: expand4((word >> 12) & 0xf),
        }
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_le_bytes(self.to_bytes())
    }
}

// Narrow channels are widened by replicating their top bits into the freed low bits, so that an
// all-ones channel maps to 0xff and zero stays zero.
const fn expand4(value: u16) -> u8 {
    ((value << 4) | value) as u8
}

const fn expand5(value: u16) -> u8 {
    ((value << 3) | (value >> 2)) as u8
}

const fn expand6(value: u16) -> u8 {
    ((value << 2) | (value >> 4)) as u8
}

/// A decoded raster image
///
/// The buffer always holds exactly `width * height * 4` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelGrid {
    /// A fully transparent black image
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; Self::buffer_size(width, height)],
        }
    }

    /// Wrap an existing canonical buffer, checking it matches the dimensions
    pub fn from_bgra(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = Self::buffer_size(width, height);
        if data.len() != expected {
            return Err(Error::InvalidPixelBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn buffer_size(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The pixel at column `x`, row `y`
    pub fn get(&self, x: u32, y: u32) -> Option<Bgra> {
        let index = self.index(x, y)?;
        let [b, g, r, a]: [u8; 4] = self.data[index..index + 4].try_into().ok()?;
        Some(Bgra { b, g, r, a })
    }

    /// Overwrite the pixel at column `x`, row `y`. Returns false if it lies outside the image.
    pub fn set(&mut self, x: u32, y: u32, pixel: Bgra) -> bool {
        let Some(index) = self.index(x, y) else {
            return false;
        };
        self.data[index..index + 4].copy_from_slice(&pixel.to_bytes());
        true
    }

    /// Rows from top to bottom, each `width * 4` bytes
    pub fn rows(&self) -> ChunksExact<'_, u8> {
        self.data.chunks_exact(self.stride().max(1))
    }

    /// Mutable pixels in row-major order, each 4 bytes
    pub fn pixels_mut(&mut self) -> ChunksExactMut<'_, u8> {
        self.data.chunks_exact_mut(4)
    }

    /// Copy of the image with red and blue swapped, as most encoders expect
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = self.data.clone();
        for pixel in rgba.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
        rgba
    }

    fn stride(&self) -> usize {
        self.width as usize * 4
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.stride() + x as usize * 4)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::pixel::{Bgra, PixelGrid};

    #[test]
    fn bgra8888_keeps_byte_order() {
        assert_eq!(
            Bgra::from_bgra8888(0x80402010),
            Bgra::new(0x10, 0x20, 0x40, 0x80)
        );
        assert_eq!(Bgra::from_bgra8888(0x80402010).to_u32(), 0x80402010);
    }

    #[test]
    fn bgr565_extremes() {
        assert_eq!(Bgra::from_bgr565(0xFFFF), Bgra::new(0xff, 0xff, 0xff, 0xff));
        assert_eq!(Bgra::from_bgr565(0x0000), Bgra::new(0x00, 0x00, 0x00, 0xff));
    }

    #[test]
    fn bgr565_channels() {
        assert_eq!(Bgra::from_bgr565(0x001F), Bgra::new(0xff, 0x00, 0x00, 0xff));
        assert_eq!(Bgra::from_bgr565(0x07E0), Bgra::new(0x00, 0xff, 0x00, 0xff));
        assert_eq!(Bgra::from_bgr565(0xF800), Bgra::new(0x00, 0x00, 0xff, 0xff));
        assert_eq!(Bgra::from_bgr565(0x0010), Bgra::new(0x84, 0x00, 0x00, 0xff));
    }

    #[test]
    fn bgra4444_channels() {
        assert_eq!(Bgra::from_bgra4444(0x0000), Bgra::new(0, 0, 0, 0));
        assert_eq!(Bgra::from_bgra4444(0xFFFF), Bgra::new(0xff, 0xff, 0xff, 0xff));
        assert_eq!(Bgra::from_bgra4444(0x1234), Bgra::new(0x44, 0x33, 0x22, 0x11));
    }

    #[test]
    fn grid_addressing() {
        let mut grid = PixelGrid::new(2, 3);
        assert_eq!(grid.as_bytes().len(), 24);

        assert!(grid.set(1, 2, Bgra::new(1, 2, 3, 4)));
        assert!(!grid.set(2, 0, Bgra::default()));

        assert_eq!(grid.get(1, 2), Some(Bgra::new(1, 2, 3, 4)));
        assert_eq!(grid.get(0, 3), None);
        assert_eq!(&grid.as_bytes()[20..], &[1, 2, 3, 4]);
        assert_eq!(grid.rows().count(), 3);
    }

    #[test]
    fn grid_rejects_mismatched_buffer() {
        let result = PixelGrid::from_bgra(2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(Error::InvalidPixelBuffer {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn empty_grid_has_no_rows() {
        let grid = PixelGrid::new(0, 5);
        assert!(grid.as_bytes().is_empty());
        assert_eq!(grid.rows().count(), 0);
    }

    #[test]
    fn rgba_conversion() -> Result<()> {
        let grid = PixelGrid::from_bgra(1, 1, vec![0x10, 0x20, 0x30, 0x40])?;
        assert_eq!(grid.to_rgba(), vec![0x30, 0x20, 0x10, 0x40]);
        Ok(())
    }
}
