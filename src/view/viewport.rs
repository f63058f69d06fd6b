//! Pointer/canvas ↔ native image coordinate mapping.
//!
//! A viewport is the affine `T(offset) * S(zoom)`: native pixels are scaled by `zoom` and
//! then translated by the pan `offset` (in canvas pixels). Zoom is applied to the
//! destination rectangle only; the full native image is always the blit source.

use crate::foundation::core::{Affine, ImageSize, Point, Rect, Vec2};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 10.0;
/// Zoom change per scroll tick.
pub const ZOOM_STEP: f64 = 0.1;
/// Keyboard pan distance at zoom 1, in canvas pixels.
pub const PAN_STEP: f64 = 20.0;

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`; NaN falls back to 1.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Zoom and pan state of one visible tile.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportState {
    /// Pan offset in canvas pixels. Never clamped: panning off-image is allowed.
    pub offset: Vec2,
    #[serde(deserialize_with = "deserialize_zoom")]
    zoom: f64,
}

fn deserialize_zoom<'de, D: serde::Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    <f64 as serde::Deserialize>::deserialize(d).map(clamp_zoom)
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// Keyboard pan direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanDirection {
    /// Move the view up (`w` / `ArrowUp`).
    Up,
    /// Move the view down (`s` / `ArrowDown`).
    Down,
    /// Move the view left (`a` / `ArrowLeft`).
    Left,
    /// Move the view right (`d` / `ArrowRight`).
    Right,
}

impl PanDirection {
    /// Map a key name to a pan direction.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" | "ArrowUp" => Some(Self::Up),
            "s" | "ArrowDown" => Some(Self::Down),
            "a" | "ArrowLeft" => Some(Self::Left),
            "d" | "ArrowRight" => Some(Self::Right),
            _ => None,
        }
    }

    fn unit(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }
}

impl ViewportState {
    /// Build a viewport; `zoom` is clamped.
    pub fn new(offset: Vec2, zoom: f64) -> Self {
        Self {
            offset,
            zoom: clamp_zoom(zoom),
        }
    }

    /// Current zoom factor, always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Native → canvas affine.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Zoom after one scroll event: a positive wheel delta zooms out by `step`, a negative
    /// one zooms in, zero leaves zoom unchanged.
    pub fn stepped_zoom(&self, scroll_delta_y: f64, step: f64) -> f64 {
        let delta = if scroll_delta_y > 0.0 {
            -step
        } else if scroll_delta_y < 0.0 {
            step
        } else {
            0.0
        };
        clamp_zoom(self.zoom + delta)
    }

    /// Apply one scroll step while keeping the native point under `pointer` fixed.
    pub fn zoom_at(&self, scroll_delta_y: f64, step: f64, pointer: Point) -> Self {
        let new_zoom = self.stepped_zoom(scroll_delta_y, step);
        Self {
            offset: recenter_zoom(self.zoom, new_zoom, pointer, self.offset),
            zoom: new_zoom,
        }
    }

    /// Pan by `step / zoom` canvas pixels so keyboard panning covers the same native
    /// distance at every zoom level.
    pub fn pan(&self, direction: PanDirection, step: f64) -> Self {
        Self {
            offset: self.offset + direction.unit() * (step / self.zoom),
            zoom: self.zoom,
        }
    }
}

/// Canvas point → native image point: `(canvas - offset) / zoom`. Not clamped; points
/// outside the image map outside `[0, width) x [0, height)`.
pub fn to_native(canvas: Point, viewport: &ViewportState) -> Point {
    viewport.to_affine().inverse() * canvas
}

/// Native image point → canvas point: `native * zoom + offset`.
pub fn to_canvas(native: Point, viewport: &ViewportState) -> Point {
    viewport.to_affine() * native
}

/// Destination rectangle the full native image is drawn into.
pub fn to_canvas_draw_rect(viewport: &ViewportState, image: ImageSize) -> Rect {
    Rect::from_origin_size(
        viewport.offset.to_point(),
        (
            f64::from(image.width) * viewport.zoom,
            f64::from(image.height) * viewport.zoom,
        ),
    )
}

/// New pan offset so the native point under `pointer` stays put when zoom changes from
/// `old_zoom` to `new_zoom`.
pub fn recenter_zoom(old_zoom: f64, new_zoom: f64, pointer: Point, old_offset: Vec2) -> Vec2 {
    let native = (pointer.to_vec2() - old_offset) / old_zoom;
    pointer.to_vec2() - native * new_zoom
}

#[cfg(test)]
#[path = "../../tests/unit/view/viewport.rs"]
mod tests;
