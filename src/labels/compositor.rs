use crate::{
    foundation::core::{ImageSize, LabelBuffer, RgbaBuffer},
    foundation::error::{SegcanvasError, SegcanvasResult},
    view::viewport::ViewportState,
};

/// How a finished gesture is merged into the label buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeCommit {
    /// Write-once paint with the given class id.
    Paint(u8),
    /// Reset covered pixels to 0.
    Erase,
}

/// An overlay pixel counts as drawn when any channel is non-zero.
#[inline]
pub fn is_pixel_set(px: &[u8]) -> bool {
    px.iter().any(|&c| c > 0)
}

/// Paint `class_id` wherever the overlay is set and the label is still 0.
///
/// Already-labelled pixels are never overwritten, so replaying the same overlay against
/// the result changes nothing.
pub fn commit_paint(
    overlay: &RgbaBuffer,
    labels: &LabelBuffer,
    class_id: u8,
) -> SegcanvasResult<LabelBuffer> {
    merge_paint(overlay, labels, None, class_id)
}

/// Like [`commit_paint`], but pixels that are non-zero in `reference` are also left
/// untouched. Used when several suggestion layers stack: the first applicable class wins.
pub fn commit_paint_with_reference(
    overlay: &RgbaBuffer,
    labels: &LabelBuffer,
    reference: &LabelBuffer,
    class_id: u8,
) -> SegcanvasResult<LabelBuffer> {
    merge_paint(overlay, labels, Some(reference), class_id)
}

/// Reset every pixel covered by the overlay to 0, whatever its previous class.
pub fn commit_erase(overlay: &RgbaBuffer, labels: &LabelBuffer) -> SegcanvasResult<LabelBuffer> {
    labels.ensure_same_size(overlay, "erase overlay")?;
    let mut out = labels.clone();
    for (dst, px) in out.as_mut_slice().iter_mut().zip(overlay.pixels()) {
        if is_pixel_set(px) {
            *dst = 0;
        }
    }
    Ok(out)
}

fn merge_paint(
    overlay: &RgbaBuffer,
    labels: &LabelBuffer,
    reference: Option<&LabelBuffer>,
    class_id: u8,
) -> SegcanvasResult<LabelBuffer> {
    if class_id == 0 {
        return Err(SegcanvasError::validation(
            "paint needs a non-zero class id; use commit_erase to clear labels",
        ));
    }
    labels.ensure_same_size(overlay, "paint overlay")?;
    if let Some(reference) = reference {
        labels.ensure_same_size(reference, "reference labels")?;
    }

    let mut out = labels.clone();
    let blocked = reference.map(LabelBuffer::as_slice);
    for (i, (dst, px)) in out
        .as_mut_slice()
        .iter_mut()
        .zip(overlay.pixels())
        .enumerate()
    {
        let occupied = blocked.is_some_and(|r| r[i] != 0);
        if *dst == 0 && !occupied && is_pixel_set(px) {
            *dst = class_id;
        }
    }
    Ok(out)
}

/// Resample a canvas-space layer (drawn under `viewport`) onto a native-size surface.
///
/// Nearest neighbour: each native pixel takes the canvas pixel under its centre after the
/// viewport transform. Native pixels whose centre lands off-canvas stay transparent.
pub fn reproject_to_native(
    animated: &RgbaBuffer,
    viewport: &ViewportState,
    native: ImageSize,
) -> SegcanvasResult<RgbaBuffer> {
    let mut out = RgbaBuffer::new(native)?;
    let zoom = viewport.zoom();

    let sample = |n: u32, offset: f64, limit: u32| -> Option<u32> {
        let c = ((f64::from(n) + 0.5) * zoom + offset).floor();
        (c >= 0.0 && c < f64::from(limit)).then_some(c as u32)
    };
    let cols: Vec<Option<u32>> = (0..native.width)
        .map(|x| sample(x, viewport.offset.x, animated.width()))
        .collect();

    for y in 0..native.height {
        let Some(cy) = sample(y, viewport.offset.y, animated.height()) else {
            continue;
        };
        for (x, cx) in cols.iter().enumerate() {
            let Some(cx) = *cx else { continue };
            let (Some(src), Some(dst)) = (animated.pixel(cx, cy), out.pixel_mut(x as u32, y))
            else {
                continue;
            };
            *dst = *src;
        }
    }
    Ok(out)
}

/// Reproject a finished gesture layer to native space and merge it into `labels`.
#[tracing::instrument(skip(animated, labels), fields(native = %labels.size()))]
pub fn commit_stroke(
    animated: &RgbaBuffer,
    viewport: &ViewportState,
    labels: &LabelBuffer,
    commit: StrokeCommit,
) -> SegcanvasResult<LabelBuffer> {
    let overlay = reproject_to_native(animated, viewport, labels.size())?;
    match commit {
        StrokeCommit::Paint(class_id) => commit_paint(&overlay, labels, class_id),
        StrokeCommit::Erase => commit_erase(&overlay, labels),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/labels/compositor.rs"]
mod tests;
