use std::io::Cursor;

use anyhow::Context;
use tiff::decoder::{Decoder, DecodingResult};

use crate::{
    foundation::core::{ImageSize, LabelBuffer, RasterImage},
    foundation::error::{SegcanvasError, SegcanvasResult},
    tiling::grid::needs_tiling,
};

/// How a decoded source is edited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// One raster within the working size.
    Single,
    /// Several same-sized frames, each edited on its own.
    Stack,
    /// One raster larger than the working size, edited as a grid of tiles.
    Large,
}

fn is_tiff(bytes: &[u8]) -> bool {
    bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*")
}

/// Decode every frame in `bytes` to straight RGBA8.
///
/// TIFF files may hold several pages; every other format yields exactly one frame.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_frames(bytes: &[u8]) -> SegcanvasResult<Vec<RasterImage>> {
    if is_tiff(bytes) {
        return decode_tiff_pages(bytes);
    }
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(vec![RasterImage::from_rgba8(
        ImageSize::new(width, height),
        rgba.into_raw(),
    )?])
}

/// Decode label frames: grey levels (first channel of each pixel) one byte per pixel.
///
/// Values are raw intensities; map them to class ids with
/// [`crate::quantize_frames`].
pub fn decode_label_frames(bytes: &[u8]) -> SegcanvasResult<Vec<LabelBuffer>> {
    decode_frames(bytes)?
        .iter()
        .map(|frame| {
            let grey = frame.pixels().pixels().map(|px| px[0]).collect();
            LabelBuffer::from_raw(frame.size(), grey)
        })
        .collect()
}

fn decode_tiff_pages(bytes: &[u8]) -> SegcanvasResult<Vec<RasterImage>> {
    let mut decoder = Decoder::new(Cursor::new(bytes))
        .map_err(|e| anyhow::anyhow!("open tiff: {e}"))?;
    let mut frames = Vec::new();
    loop {
        let (width, height) = decoder
            .dimensions()
            .map_err(|e| anyhow::anyhow!("read tiff page dimensions: {e}"))?;
        let colortype = decoder
            .colortype()
            .map_err(|e| anyhow::anyhow!("read tiff page colour type: {e}"))?;
        let raw = decoder
            .read_image()
            .map_err(|e| anyhow::anyhow!("decode tiff page {}: {e}", frames.len()))?;

        let size = ImageSize::new(width, height);
        let rgba = page_to_rgba8(size, colortype, raw)?;
        frames.push(RasterImage::from_rgba8(size, rgba)?);

        if !decoder.more_images() {
            break;
        }
        decoder
            .next_image()
            .map_err(|e| anyhow::anyhow!("advance to tiff page {}: {e}", frames.len()))?;
    }
    tracing::debug!(pages = frames.len(), "decoded tiff");
    Ok(frames)
}

fn page_to_rgba8(
    size: ImageSize,
    colortype: tiff::ColorType,
    raw: DecodingResult,
) -> SegcanvasResult<Vec<u8>> {
    let samples: Vec<u8> = match raw {
        DecodingResult::U8(v) => v,
        DecodingResult::U16(v) => v.into_iter().map(|s| (s >> 8) as u8).collect(),
        _ => {
            return Err(SegcanvasError::unsupported(format!(
                "tiff sample format for {colortype:?} is not 8 or 16 bit unsigned"
            )));
        }
    };

    let channels = match colortype {
        tiff::ColorType::Gray(_) => 1,
        tiff::ColorType::GrayA(_) => 2,
        tiff::ColorType::RGB(_) => 3,
        tiff::ColorType::RGBA(_) => 4,
        other => {
            return Err(SegcanvasError::unsupported(format!(
                "tiff colour type {other:?}"
            )));
        }
    };
    let expected = size.byte_len(channels)?;
    if samples.len() != expected {
        return Err(SegcanvasError::dimension_mismatch(format!(
            "tiff page {size} with {channels} channel(s) decoded to {} samples, expected {expected}",
            samples.len()
        )));
    }

    let mut out = Vec::with_capacity(size.byte_len(4)?);
    for px in samples.chunks_exact(channels) {
        let rgba = match *px {
            [g] => [g, g, g, 255],
            [g, a] => [g, g, g, a],
            [r, g, b] => [r, g, b, 255],
            [r, g, b, a] => [r, g, b, a],
            _ => [0, 0, 0, 0],
        };
        out.extend_from_slice(&rgba);
    }
    Ok(out)
}

/// Decide how a decoded source is edited.
///
/// One frame is [`SourceKind::Large`] when it exceeds `max_tile` on either side, else
/// [`SourceKind::Single`]. Several frames form a [`SourceKind::Stack`] and must share a
/// size within the working limit.
pub fn classify_frames(frames: &[RasterImage], max_tile: u32) -> SegcanvasResult<SourceKind> {
    let Some(first) = frames.first() else {
        return Err(SegcanvasError::unsupported("source has no frames"));
    };
    if let Some(empty) = frames.iter().find(|f| f.size().is_empty()) {
        return Err(SegcanvasError::unsupported(format!(
            "frame of size {} has no pixels",
            empty.size()
        )));
    }

    if frames.len() == 1 {
        return Ok(if needs_tiling(first.size(), max_tile) {
            SourceKind::Large
        } else {
            SourceKind::Single
        });
    }

    if let Some(odd) = frames.iter().find(|f| f.size() != first.size()) {
        return Err(SegcanvasError::unsupported(format!(
            "stack frames differ in size ({} vs {})",
            first.size(),
            odd.size()
        )));
    }
    if needs_tiling(first.size(), max_tile) {
        return Err(SegcanvasError::unsupported(format!(
            "stack frames of {} exceed the {max_tile}px working size",
            first.size()
        )));
    }
    Ok(SourceKind::Stack)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
