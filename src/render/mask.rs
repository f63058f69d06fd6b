//! Inference tensor → RGBA overlay, and palette colourization of label buffers.

use crate::{
    foundation::core::{ImageSize, LabelBuffer, RgbaBuffer},
    foundation::error::{SegcanvasError, SegcanvasResult},
    render::palette::{class_colour, with_alpha},
};

/// Alpha of a live mask preview (`0.4 * 255`).
pub const MASK_OPACITY: u8 = 102;

/// Masks per inference response.
pub const MASKS_PER_RESPONSE: usize = 4;

/// Flat multi-mask model output: `masks` stacked `rows x cols` planes.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskTensor {
    data: Vec<f32>,
    masks: usize,
    rows: usize,
    cols: usize,
}

impl MaskTensor {
    /// Accepts `[1, masks, rows, cols]` or `[masks, rows, cols]`.
    pub fn from_shape(dims: &[usize], data: Vec<f32>) -> SegcanvasResult<Self> {
        let (masks, rows, cols) = match *dims {
            [1, m, r, c] | [m, r, c] => (m, r, c),
            _ => {
                return Err(SegcanvasError::unsupported(format!(
                    "mask tensor shape {dims:?} is not [1, masks, rows, cols]"
                )));
            }
        };
        let expected = masks
            .checked_mul(rows)
            .and_then(|v| v.checked_mul(cols))
            .ok_or_else(|| SegcanvasError::unsupported("mask tensor shape overflows"))?;
        if expected == 0 || data.len() != expected {
            return Err(SegcanvasError::unsupported(format!(
                "mask tensor shape {dims:?} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            masks,
            rows,
            cols,
        })
    }

    /// Number of stacked masks.
    pub fn masks(&self) -> usize {
        self.masks
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    /// Render one mask of this tensor; see [`render_mask`].
    pub fn render(
        &self,
        mask_index: usize,
        class_id: u8,
        reference: Option<&LabelBuffer>,
    ) -> SegcanvasResult<RgbaBuffer> {
        if mask_index >= self.masks {
            return Err(SegcanvasError::unsupported(format!(
                "mask index {mask_index} out of range for {} masks",
                self.masks
            )));
        }
        render_mask(
            &self.data,
            dim_u32(self.rows)?,
            dim_u32(self.cols)?,
            mask_index,
            class_id,
            reference,
        )
    }
}

fn dim_u32(v: usize) -> SegcanvasResult<u32> {
    u32::try_from(v).map_err(|_| SegcanvasError::unsupported(format!("mask dimension {v} too large")))
}

/// Overlay for mask `mask_index` of a flat tensor whose planes are `width * height` long.
///
/// A pixel qualifies when its value is above 0.0 and, with a reference, the reference is
/// still unlabelled there. Qualifying pixels get the class colour at [`MASK_OPACITY`].
/// The model emits planes transposed, so the output is `height` wide and `width` tall;
/// flat indices are kept as-is and the reference is read in the output's layout.
pub fn render_mask(
    tensor: &[f32],
    width: u32,
    height: u32,
    mask_index: usize,
    class_id: u8,
    reference: Option<&LabelBuffer>,
) -> SegcanvasResult<RgbaBuffer> {
    let out_size = ImageSize::new(height, width);
    let plane = out_size.pixel_count();
    let offset = mask_index
        .checked_mul(plane)
        .filter(|&o| o.checked_add(plane).is_some_and(|end| end <= tensor.len()))
        .ok_or_else(|| {
            SegcanvasError::unsupported(format!(
                "mask {mask_index} of {width}x{height} exceeds a tensor of {} values",
                tensor.len()
            ))
        })?;

    let mut out = RgbaBuffer::new(out_size)?;
    if let Some(reference) = reference {
        out.ensure_same_size(reference, "mask reference labels")?;
    }

    let colour = with_alpha(class_colour(class_id), MASK_OPACITY);
    let values = &tensor[offset..offset + plane];
    let blocked = reference.map(LabelBuffer::as_slice);
    for (i, (px, &v)) in out
        .as_mut_slice()
        .chunks_exact_mut(4)
        .zip(values)
        .enumerate()
    {
        let free = blocked.is_none_or(|r| r[i] == 0);
        if v > 0.0 && free {
            px.copy_from_slice(&colour);
        }
    }
    Ok(out)
}

/// Colourize a label or segmentation buffer for display. Class 0 stays transparent.
pub fn render_classes(labels: &LabelBuffer, opacity: u8) -> SegcanvasResult<RgbaBuffer> {
    let mut out = RgbaBuffer::new(labels.size())?;
    for (px, &class_id) in out.as_mut_slice().chunks_exact_mut(4).zip(labels.as_slice()) {
        if class_id != 0 {
            px.copy_from_slice(&with_alpha(class_colour(class_id), opacity));
        }
    }
    Ok(out)
}

/// Next mask to preview when the user cycles masks: `1 → 2 → 3 → 1`.
///
/// Mask 0 is the model's single-mask output and is never part of the cycle.
pub fn next_mask_index(current: usize) -> usize {
    (current % 3) + 1
}

#[cfg(test)]
#[path = "../../tests/unit/render/mask.rs"]
mod tests;
