use crate::{
    foundation::core::LabelBuffer,
    foundation::error::{SegcanvasError, SegcanvasResult},
    foundation::math::round_div_u8,
};

/// Smallest non-zero intensity across all `frames`.
///
/// Imported label images store classes as evenly spaced grey levels; the first level is
/// taken as the step between classes.
pub fn intensity_delta<'a, I>(frames: I) -> SegcanvasResult<u8>
where
    I: IntoIterator<Item = &'a LabelBuffer>,
{
    frames
        .into_iter()
        .flat_map(|f| f.as_slice().iter().copied())
        .filter(|&v| v > 0)
        .min()
        .ok_or_else(|| {
            SegcanvasError::degenerate_quantization("label source has no non-zero intensity")
        })
}

/// Map grey levels to class ids: `round(v / delta)` per pixel.
///
/// Sources whose levels are not multiples of `delta` land on the nearest class.
pub fn quantize_intensities(frame: &LabelBuffer, delta: u8) -> SegcanvasResult<LabelBuffer> {
    if delta == 0 {
        return Err(SegcanvasError::degenerate_quantization("delta must be > 0"));
    }
    let data = frame
        .as_slice()
        .iter()
        .map(|&v| round_div_u8(v, delta))
        .collect();
    LabelBuffer::from_raw(frame.size(), data)
}

/// Quantize every frame with one delta shared across the whole source.
#[tracing::instrument(skip(frames), fields(frames = frames.len()))]
pub fn quantize_frames(frames: &[LabelBuffer]) -> SegcanvasResult<Vec<LabelBuffer>> {
    let delta = intensity_delta(frames)?;
    tracing::debug!(delta, "quantizing label frames");
    frames
        .iter()
        .map(|f| quantize_intensities(f, delta))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/tiling/quantize.rs"]
mod tests;
