use std::sync::Arc;

use crate::foundation::error::{SegcanvasError, SegcanvasResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Width and height of a raster in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Build a size from width and height.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// True when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when `(x, y)` addresses a pixel inside this size.
    pub fn contains(self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    pub(crate) fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub(crate) fn byte_len(self, channels: usize) -> SegcanvasResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(channels))
            .ok_or_else(|| SegcanvasError::validation("buffer size overflow"))
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Row-major, tightly packed pixel buffer with `C` bytes per pixel.
///
/// The byte length always equals `width * height * C`; every constructor checks this, so
/// indexing through [`PixelBuffer::index_of`] and friends never needs a stride argument.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer<const C: usize> {
    size: ImageSize,
    data: Vec<u8>,
}

/// Straight-alpha RGBA8 buffer (overlays, animated layers, decoded frames).
pub type RgbaBuffer = PixelBuffer<4>;

/// One class id byte per pixel; 0 means unlabelled.
pub type LabelBuffer = PixelBuffer<1>;

impl<const C: usize> std::fmt::Debug for PixelBuffer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("channels", &C)
            .field("size", &self.size)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl<const C: usize> PixelBuffer<C> {
    /// Bytes per pixel.
    pub const CHANNELS: usize = C;

    /// Zero-filled buffer of the given size.
    pub fn new(size: ImageSize) -> SegcanvasResult<Self> {
        let len = size.byte_len(C)?;
        Ok(Self {
            size,
            data: vec![0u8; len],
        })
    }

    /// Wrap existing bytes; the length must be exactly `width * height * C`.
    pub fn from_raw(size: ImageSize, data: Vec<u8>) -> SegcanvasResult<Self> {
        let expected = size.byte_len(C)?;
        if data.len() != expected {
            return Err(SegcanvasError::dimension_mismatch(format!(
                "{size} buffer with {C} channel(s) needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self { size, data })
    }

    /// Buffer dimensions.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.size.pixel_count()
    }

    /// Raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Raw bytes, mutable.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if !self.size.contains(x, y) {
            return None;
        }
        Some((y as usize) * (self.size.width as usize) + (x as usize))
    }

    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8; C]> {
        let i = self.index_of(x, y)? * C;
        <&[u8; C]>::try_from(&self.data[i..i + C]).ok()
    }

    /// Mutable pixel at `(x, y)`.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8; C]> {
        let i = self.index_of(x, y)? * C;
        <&mut [u8; C]>::try_from(&mut self.data[i..i + C]).ok()
    }

    pub(crate) fn pixel_at(&self, i: usize) -> Option<&[u8; C]> {
        let start = i.checked_mul(C)?;
        let px = self.data.get(start..start.checked_add(C)?)?;
        <&[u8; C]>::try_from(px).ok()
    }

    /// Iterator over pixels in row-major order.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(C)
    }

    /// Reset every byte to zero.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Fail with a dimension mismatch unless `other` has the same width and height.
    pub fn ensure_same_size<const D: usize>(
        &self,
        other: &PixelBuffer<D>,
        what: &str,
    ) -> SegcanvasResult<()> {
        if self.size != other.size {
            return Err(SegcanvasError::dimension_mismatch(format!(
                "{what}: expected {}, got {}",
                self.size, other.size
            )));
        }
        Ok(())
    }

    /// Copy out the `size` region whose top-left corner is `(x0, y0)`.
    pub fn crop(&self, x0: u32, y0: u32, size: ImageSize) -> SegcanvasResult<Self> {
        self.check_region(x0, y0, size)?;
        let mut out = Self::new(size)?;
        let src_stride = self.size.width as usize * C;
        let row_len = size.width as usize * C;
        for row in 0..size.height as usize {
            let src = (y0 as usize + row) * src_stride + x0 as usize * C;
            let dst = row * row_len;
            out.data[dst..dst + row_len].copy_from_slice(&self.data[src..src + row_len]);
        }
        Ok(out)
    }

    /// Copy all of `src` into this buffer with its top-left corner at `(x0, y0)`.
    pub fn blit(&mut self, src: &Self, x0: u32, y0: u32) -> SegcanvasResult<()> {
        self.check_region(x0, y0, src.size)?;
        let dst_stride = self.size.width as usize * C;
        let row_len = src.size.width as usize * C;
        for row in 0..src.size.height as usize {
            let dst = (y0 as usize + row) * dst_stride + x0 as usize * C;
            let s = row * row_len;
            self.data[dst..dst + row_len].copy_from_slice(&src.data[s..s + row_len]);
        }
        Ok(())
    }

    fn check_region(&self, x0: u32, y0: u32, size: ImageSize) -> SegcanvasResult<()> {
        let fits_x = x0
            .checked_add(size.width)
            .is_some_and(|x1| x1 <= self.size.width);
        let fits_y = y0
            .checked_add(size.height)
            .is_some_and(|y1| y1 <= self.size.height);
        if !fits_x || !fits_y {
            return Err(SegcanvasError::dimension_mismatch(format!(
                "region {size} at ({x0}, {y0}) exceeds {}",
                self.size
            )));
        }
        Ok(())
    }
}

impl PixelBuffer<1> {
    /// Class id at `(x, y)`.
    pub fn class_at(&self, x: u32, y: u32) -> Option<u8> {
        self.index_of(x, y).map(|i| self.data[i])
    }

    /// Overwrite the class id at `(x, y)`; returns false when out of bounds.
    pub fn set_class(&mut self, x: u32, y: u32, class_id: u8) -> bool {
        match self.index_of(x, y) {
            Some(i) => {
                self.data[i] = class_id;
                true
            }
            None => false,
        }
    }

    /// Largest class id present (0 for an unlabelled buffer).
    pub fn max_class(&self) -> u8 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Number of pixels carrying `class_id`.
    pub fn count_class(&self, class_id: u8) -> usize {
        self.data.iter().filter(|&&v| v == class_id).count()
    }
}

/// Immutable RGBA raster shared between the session, tiles and render steps.
///
/// Never mutated in place: loading a new image replaces the value wholesale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    pixels: Arc<RgbaBuffer>,
}

impl RasterImage {
    /// Wrap straight-alpha RGBA8 bytes.
    pub fn from_rgba8(size: ImageSize, data: Vec<u8>) -> SegcanvasResult<Self> {
        Ok(Self::from_buffer(RgbaBuffer::from_raw(size, data)?))
    }

    /// Wrap an existing RGBA buffer.
    pub fn from_buffer(pixels: RgbaBuffer) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Raster dimensions.
    pub fn size(&self) -> ImageSize {
        self.pixels.size()
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Underlying pixel buffer.
    pub fn pixels(&self) -> &RgbaBuffer {
        &self.pixels
    }

    /// Independent raster holding the `size` region at `(x0, y0)`.
    pub fn crop(&self, x0: u32, y0: u32, size: ImageSize) -> SegcanvasResult<Self> {
        Ok(Self::from_buffer(self.pixels.crop(x0, y0, size)?))
    }
}

/// Classifier output: one class id per pixel, read-only to the labelling core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentationBuffer(LabelBuffer);

impl SegmentationBuffer {
    /// Wrap classifier class ids.
    pub fn new(classes: LabelBuffer) -> Self {
        Self(classes)
    }

    /// All-zero segmentation of the given size.
    pub fn empty(size: ImageSize) -> SegcanvasResult<Self> {
        Ok(Self(LabelBuffer::new(size)?))
    }

    /// Buffer dimensions.
    pub fn size(&self) -> ImageSize {
        self.0.size()
    }

    /// Class ids as a label-shaped buffer.
    pub fn classes(&self) -> &LabelBuffer {
        &self.0
    }

    /// Consume into the inner buffer.
    pub fn into_inner(self) -> LabelBuffer {
        self.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
