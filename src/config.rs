use std::{path::Path, time::Duration};

use anyhow::Context;

use crate::{
    foundation::core::ImageSize,
    foundation::error::{SegcanvasError, SegcanvasResult},
    foundation::math::unit_to_u8,
    labels::stroke::SNAP_RADIUS_SQ,
    tiling::grid::MAX_TILE,
    view::viewport::{PAN_STEP, ZOOM_STEP},
};

/// Editor tunables. Every field has a default, so a partial JSON document is enough.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Size of the drawing canvas (and of every animated layer).
    pub canvas: ImageSize,
    /// Largest tile side before an image is split.
    pub max_tile: u32,
    /// Minimum spacing of pointer-move driven work, in milliseconds.
    pub throttle_ms: u64,
    /// Zoom change per scroll tick.
    pub zoom_step: f64,
    /// Keyboard pan distance at zoom 1.
    pub pan_step: f64,
    /// Brush and eraser diameter in canvas pixels.
    pub brush_width: f64,
    /// Alpha of committed labels in previews.
    pub label_opacity: u8,
    /// Alpha of classifier output in previews.
    pub segmentation_opacity: u8,
    /// Squared canvas distance for polygon snap-to-start.
    pub snap_radius_sq: f64,
    /// Spread class ids over the grey range on export.
    pub rescale: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: ImageSize::new(1024, 1024),
            max_tile: MAX_TILE,
            throttle_ms: 15,
            zoom_step: ZOOM_STEP,
            pan_step: PAN_STEP,
            brush_width: 1.0,
            label_opacity: unit_to_u8(0.6),
            segmentation_opacity: unit_to_u8(0.9),
            snap_radius_sq: SNAP_RADIUS_SQ,
            rescale: true,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> SegcanvasResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse editor config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SegcanvasResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read editor config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Throttle interval as a duration.
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Reject settings the editor cannot work with.
    pub fn validate(&self) -> SegcanvasResult<()> {
        if self.canvas.is_empty() {
            return Err(SegcanvasError::validation("canvas width/height must be > 0"));
        }
        if self.max_tile == 0 {
            return Err(SegcanvasError::validation("max_tile must be > 0"));
        }
        for (name, v) in [
            ("zoom_step", self.zoom_step),
            ("pan_step", self.pan_step),
            ("brush_width", self.brush_width),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(SegcanvasError::validation(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
        }
        if !(self.snap_radius_sq.is_finite() && self.snap_radius_sq >= 0.0) {
            return Err(SegcanvasError::validation("snap_radius_sq must be finite and >= 0"));
        }
        Ok(())
    }
}
