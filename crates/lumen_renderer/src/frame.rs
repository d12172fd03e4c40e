//! Destination pixel buffer layout.
//!
//! Pixels are packed B,G,R(,pad) at `row * stride + col * bytes_per_pixel`.
//! A [`FrameLayout`] is validated once, after which every row and pixel
//! offset it produces is in bounds for a buffer that passed
//! [`FrameLayout::check_buffer`].

use crate::{RenderError, RenderResult};

/// Value written to the fourth byte of 4-byte pixels.
pub const PAD_BYTE: u8 = 0xFF;

/// Validated geometry of a caller-owned pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    width: u32,
    height: u32,
    stride: usize,
    bytes_per_pixel: usize,
}

impl FrameLayout {
    /// Create a layout, rejecting sizes that could index outside a row.
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        bytes_per_pixel: usize,
    ) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyFrame { width, height });
        }
        if bytes_per_pixel != 3 && bytes_per_pixel != 4 {
            return Err(RenderError::UnsupportedPixelSize(bytes_per_pixel));
        }
        let row_bytes = width as usize * bytes_per_pixel;
        if stride < row_bytes {
            return Err(RenderError::StrideTooSmall { stride, row_bytes });
        }

        Ok(Self {
            width,
            height,
            stride,
            bytes_per_pixel,
        })
    }

    /// Layout with no padding between rows.
    pub fn packed(width: u32, height: u32, bytes_per_pixel: usize) -> RenderResult<Self> {
        Self::new(width, height, width as usize * bytes_per_pixel, bytes_per_pixel)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    /// Bytes of pixel data in one row (excluding stride padding).
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel
    }

    /// Byte offset of the first pixel of `row`.
    pub fn row_offset(&self, row: u32) -> usize {
        row as usize * self.stride
    }

    /// Minimum buffer length; the last row needs no trailing padding.
    pub fn required_len(&self) -> usize {
        self.row_offset(self.height - 1) + self.row_bytes()
    }

    /// Check that a buffer of `len` bytes can hold the whole frame.
    pub fn check_buffer(&self, len: usize) -> RenderResult<()> {
        let required = self.required_len();
        if len < required {
            return Err(RenderError::BufferTooSmall { actual: len, required });
        }
        Ok(())
    }

    /// Allocate a zeroed buffer sized for this layout, including the last
    /// row's stride padding.
    pub fn allocate(&self) -> Vec<u8> {
        vec![0; self.stride * self.height as usize]
    }

    /// Write one pixel into a row buffer of [`Self::row_bytes`] length.
    #[inline]
    pub fn write_pixel(&self, row: &mut [u8], x: u32, bgr: [u8; 3]) {
        let index = x as usize * self.bytes_per_pixel;
        row[index..index + 3].copy_from_slice(&bgr);
        if self.bytes_per_pixel == 4 {
            row[index + 3] = PAD_BYTE;
        }
    }
}
