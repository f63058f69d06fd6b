use std::io::Cursor;

use tiff::encoder::{TiffEncoder, colortype};

use crate::{
    assets::decode::SourceKind,
    foundation::core::LabelBuffer,
    foundation::error::{SegcanvasError, SegcanvasResult},
    tiling::grid::{TileIndex, merge_label_tiles},
};

/// Multiplier applied to class ids on export so classes spread over the grey range.
///
/// `floor(255 / max_class)` when rescaling, else 1. An unlabelled source also gets 1.
pub fn export_delta(max_class: u8, rescale: bool) -> u8 {
    if !rescale || max_class == 0 {
        return 1;
    }
    255 / max_class
}

/// Assemble the label buffers of a session into output frames.
///
/// `Single` takes exactly one buffer; `Stack` keeps one frame per buffer; `Large`
/// reassembles the tiles of `grid` into one full-size frame. The rescale delta is computed
/// from the largest class over all buffers.
#[tracing::instrument(skip(labels, grid), fields(buffers = labels.len()))]
pub fn composite_labels(
    kind: SourceKind,
    labels: &[LabelBuffer],
    grid: Option<&TileIndex>,
    rescale: bool,
) -> SegcanvasResult<Vec<LabelBuffer>> {
    let max_class = labels.iter().map(LabelBuffer::max_class).max().unwrap_or(0);
    let delta = export_delta(max_class, rescale);
    tracing::debug!(max_class, delta, "compositing labels");

    let frames = match kind {
        SourceKind::Single => {
            let [only] = labels else {
                return Err(SegcanvasError::validation(format!(
                    "single export needs one label buffer, got {}",
                    labels.len()
                )));
            };
            vec![only.clone()]
        }
        SourceKind::Stack => {
            let Some(first) = labels.first() else {
                return Err(SegcanvasError::validation("stack export needs label buffers"));
            };
            for l in labels {
                first.ensure_same_size(l, "stack frame labels")?;
            }
            labels.to_vec()
        }
        SourceKind::Large => {
            let grid = grid.ok_or_else(|| {
                SegcanvasError::validation("large export needs the tile grid")
            })?;
            vec![merge_label_tiles(labels, grid)?]
        }
    };

    Ok(frames
        .into_iter()
        .map(|mut f| {
            if delta != 1 {
                for v in f.as_mut_slice() {
                    *v = v.saturating_mul(delta);
                }
            }
            f
        })
        .collect())
}

/// Encode frames as a grayscale (min-is-black) TIFF, one page per frame.
pub fn encode_label_tiff(frames: &[LabelBuffer]) -> SegcanvasResult<Vec<u8>> {
    if frames.is_empty() {
        return Err(SegcanvasError::validation("nothing to encode"));
    }
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder =
            TiffEncoder::new(&mut cursor).map_err(|e| anyhow::anyhow!("create tiff encoder: {e}"))?;
        for (i, frame) in frames.iter().enumerate() {
            encoder
                .write_image::<colortype::Gray8>(frame.width(), frame.height(), frame.as_slice())
                .map_err(|e| anyhow::anyhow!("write tiff page {i}: {e}"))?;
        }
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/export.rs"]
mod tests;
