//! Values exchanged with the promptable segmentation model.

use std::sync::Arc;

use crate::{
    foundation::core::{ImageSize, Point},
    foundation::error::{SegcanvasError, SegcanvasResult},
    render::mask::MaskTensor,
};

/// Longest image side the model works at.
pub const MODEL_LONG_SIDE: f64 = 1024.0;

/// Whether a prompt point marks the object or the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Include the region under the point.
    Positive,
    /// Exclude the region under the point.
    Negative,
}

impl PromptKind {
    /// Label value the model expects for this kind.
    pub fn model_label(self) -> f32 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => 0.0,
        }
    }
}

/// Prompt click in native image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PromptPoint {
    /// Native x.
    pub x: f64,
    /// Native y.
    pub y: f64,
    /// Include or exclude.
    pub kind: PromptKind,
}

/// Scale from native pixels to the model's input resolution.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelScale {
    /// Native size of the image the embedding was computed for.
    pub size: ImageSize,
    /// Factor putting the longest side at [`MODEL_LONG_SIDE`].
    pub sam_scale: f64,
}

impl ModelScale {
    /// Scale for an image of `size`.
    pub fn for_size(size: ImageSize) -> SegcanvasResult<Self> {
        let long = size.width.max(size.height);
        if long == 0 {
            return Err(SegcanvasError::unsupported("cannot scale an empty image"));
        }
        Ok(Self {
            size,
            sam_scale: MODEL_LONG_SIDE / f64::from(long),
        })
    }

    /// Native point in model coordinates.
    pub fn to_model(&self, p: Point) -> Point {
        Point::new(p.x * self.sam_scale, p.y * self.sam_scale)
    }
}

/// Image embedding produced by the model's encoder. Opaque to the labelling core.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageEmbedding {
    /// Tensor shape as reported by the encoder.
    pub shape: Vec<usize>,
    /// Flat values.
    pub data: Arc<[f32]>,
}

/// Everything one decoder call needs.
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceRequest {
    /// Prompt clicks, native coordinates.
    pub points: Vec<PromptPoint>,
    /// Embedding of the active tile.
    pub embedding: ImageEmbedding,
    /// Native → model scaling for the active tile.
    pub model_scale: ModelScale,
}

impl InferenceRequest {
    /// Flat `[x0, y0, x1, y1, ..]` model coordinates and matching labels.
    ///
    /// A padding point `(0, 0)` with label `-1` is appended, as the decoder expects when no
    /// box prompt is given.
    pub fn point_inputs(&self) -> (Vec<f32>, Vec<f32>) {
        let mut coords = Vec::with_capacity(2 * (self.points.len() + 1));
        let mut labels = Vec::with_capacity(self.points.len() + 1);
        for p in &self.points {
            let m = self.model_scale.to_model(Point::new(p.x, p.y));
            coords.extend_from_slice(&[m.x as f32, m.y as f32]);
            labels.push(p.kind.model_label());
        }
        coords.extend_from_slice(&[0.0, 0.0]);
        labels.push(-1.0);
        (coords, labels)
    }
}

/// A promptable segmentation model. Implementations run the decoder and return the raw
/// multi-mask tensor.
pub trait MaskPredictor {
    /// Predict masks for `request`.
    fn predict(&mut self, request: &InferenceRequest) -> SegcanvasResult<MaskTensor>;
}

#[cfg(test)]
#[path = "../../tests/unit/boundary/inference.rs"]
mod tests;
