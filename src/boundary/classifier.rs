//! Request/response shapes for the remote pixel classifier.
//!
//! The transport itself lives outside the crate; this module builds the payload and
//! interprets the flat byte response.

use std::io::Cursor;

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    assets::decode::SourceKind,
    foundation::core::{ImageSize, LabelBuffer, RasterImage, SegmentationBuffer},
    foundation::error::{SegcanvasError, SegcanvasResult},
};

/// Training knobs forwarded to the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassifierOptions {
    /// Training pixels sampled over all classes.
    pub n_points: u32,
    /// Train on every frame rather than only labelled ones.
    pub train_all: bool,
    /// Spread class ids over the grey range in saved outputs.
    pub rescale: bool,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            n_points: 40_000,
            train_all: false,
            rescale: true,
        }
    }
}

/// Payload for a train (with labels) or apply (without) classifier call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClassifierRequest {
    /// Every frame or tile, JPEG encoded. Sent as `data:image/jpeg;base64,` URLs.
    #[serde(serialize_with = "jpeg_data_urls")]
    pub images: Vec<Vec<u8>>,
    /// Label buffers matching `images`, sent base64 encoded; absent for apply-only calls.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "base64_buffers"
    )]
    pub labels: Option<Vec<Vec<u8>>>,
    /// How the frames relate to each other.
    pub save_mode: SourceKind,
    /// Full size for large (tiled) sources, zero otherwise.
    pub large_w: u32,
    /// See `large_w`.
    pub large_h: u32,
    /// Training knobs.
    #[serde(flatten)]
    pub options: ClassifierOptions,
}

impl ClassifierRequest {
    /// Encode `images` and pair them with `labels` (pass `None` to apply a trained
    /// classifier without retraining).
    #[tracing::instrument(skip(images, labels), fields(images = images.len()))]
    pub fn new(
        images: &[RasterImage],
        labels: Option<&[LabelBuffer]>,
        save_mode: SourceKind,
        large: Option<ImageSize>,
        options: ClassifierOptions,
    ) -> SegcanvasResult<Self> {
        if let Some(labels) = labels {
            if labels.len() != images.len() {
                return Err(SegcanvasError::dimension_mismatch(format!(
                    "{} images but {} label buffers",
                    images.len(),
                    labels.len()
                )));
            }
            for (img, l) in images.iter().zip(labels) {
                img.pixels().ensure_same_size(l, "classifier labels")?;
            }
        }
        let encoded = images
            .iter()
            .map(encode_jpeg)
            .collect::<SegcanvasResult<Vec<_>>>()?;
        let large = large.unwrap_or(ImageSize::new(0, 0));
        Ok(Self {
            images: encoded,
            labels: labels.map(|ls| ls.iter().map(|l| l.as_slice().to_vec()).collect()),
            save_mode,
            large_w: large.width,
            large_h: large.height,
            options,
        })
    }

    /// JSON body for the transport.
    pub fn to_json(&self) -> SegcanvasResult<String> {
        Ok(serde_json::to_string(self).context("serialize classifier request")?)
    }
}

const JPEG_DATA_URL: &str = "data:image/jpeg;base64,";

fn jpeg_data_urls<S: serde::Serializer>(images: &[Vec<u8>], ser: S) -> Result<S::Ok, S::Error> {
    ser.collect_seq(
        images
            .iter()
            .map(|jpeg| format!("{JPEG_DATA_URL}{}", STANDARD.encode(jpeg))),
    )
}

fn base64_buffers<S: serde::Serializer>(
    buffers: &Option<Vec<Vec<u8>>>,
    ser: S,
) -> Result<S::Ok, S::Error> {
    match buffers {
        Some(buffers) => ser.collect_seq(buffers.iter().map(|b| STANDARD.encode(b))),
        None => ser.serialize_none(),
    }
}

fn encode_jpeg(image: &RasterImage) -> SegcanvasResult<Vec<u8>> {
    let rgba = image::RgbaImage::from_raw(image.width(), image.height(), image.pixels().as_slice().to_vec())
        .ok_or_else(|| SegcanvasError::dimension_mismatch("raster bytes do not fill its size"))?;
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .context("encode jpeg for classifier")?;
    Ok(buf)
}

/// A remote pixel classifier. Both calls return the flat response bytes; see
/// [`split_classifier_response`].
pub trait Classifier {
    /// Train on labelled pixels and segment every image.
    fn train(&mut self, request: &ClassifierRequest) -> SegcanvasResult<Vec<u8>>;

    /// Segment with the last trained model.
    fn apply(&mut self, request: &ClassifierRequest) -> SegcanvasResult<Vec<u8>>;
}

/// Slice one flat class-id response into per-image segmentations, in request order.
///
/// The response must be exactly the sum of the image areas.
pub fn split_classifier_response(
    bytes: &[u8],
    sizes: &[ImageSize],
) -> SegcanvasResult<Vec<SegmentationBuffer>> {
    let expected = sizes
        .iter()
        .try_fold(0usize, |acc, s| acc.checked_add(s.pixel_count()))
        .ok_or_else(|| SegcanvasError::validation("response size overflow"))?;
    if bytes.len() != expected {
        return Err(SegcanvasError::dimension_mismatch(format!(
            "classifier returned {} bytes for {} image(s) totalling {expected} pixels",
            bytes.len(),
            sizes.len()
        )));
    }

    let mut rest = bytes;
    let mut out = Vec::with_capacity(sizes.len());
    for &size in sizes {
        let (head, tail) = rest.split_at(size.pixel_count());
        out.push(SegmentationBuffer::new(LabelBuffer::from_raw(size, head.to_vec())?));
        rest = tail;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/boundary/classifier.rs"]
mod tests;
