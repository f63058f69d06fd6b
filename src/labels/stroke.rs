//! Rasterization of gestures into the per-gesture animated layer.
//!
//! Everything here works in canvas pixels; the layer is reprojected to native space only
//! when the gesture is committed.

use kurbo::Shape as _;

use crate::{
    foundation::core::{BezPath, ImageSize, Point, RgbaBuffer},
    foundation::error::SegcanvasResult,
};

/// Colour stamped by erase gestures. Only "is any channel set" matters to the compositor.
pub const ERASE_COLOUR: [u8; 4] = [255, 255, 255, 255];

/// Squared canvas distance under which a polygon click snaps to the first vertex.
pub const SNAP_RADIUS_SQ: f64 = 250.0;

/// Brush diameter in canvas pixels that still reaches a native pixel centre at `zoom`.
///
/// Commits resample the canvas at one point per native pixel, so above zoom 1 a narrower
/// brush can fall between samples. The disc must reach the nearest sample wherever it is
/// placed: half the sample diagonal plus half a canvas pixel of rounding, on each side.
pub fn covering_brush_width(width: f64, zoom: f64) -> f64 {
    if zoom <= 1.0 {
        return width;
    }
    width.max((zoom + 1.0) * std::f64::consts::SQRT_2)
}

/// Canvas-sized RGBA surface scoped to one pointer gesture.
#[derive(Clone, Debug)]
pub struct AnimatedLayer {
    pixels: RgbaBuffer,
}

impl AnimatedLayer {
    /// Transparent layer covering the whole canvas.
    pub fn new(canvas: ImageSize) -> SegcanvasResult<Self> {
        Ok(Self {
            pixels: RgbaBuffer::new(canvas)?,
        })
    }

    /// Canvas size.
    pub fn size(&self) -> ImageSize {
        self.pixels.size()
    }

    /// Drawn pixels.
    pub fn pixels(&self) -> &RgbaBuffer {
        &self.pixels
    }

    /// Make every pixel transparent again.
    pub fn clear(&mut self) {
        self.pixels.clear();
    }

    /// True when nothing has been drawn.
    pub fn is_blank(&self) -> bool {
        self.pixels.as_slice().iter().all(|&b| b == 0)
    }

    /// Filled disc of diameter `width` centred on `centre`. The pixel under the centre is
    /// always covered, so width 1 draws single pixels.
    pub fn stamp_brush(&mut self, centre: Point, width: f64, colour: [u8; 4]) {
        let r = (width * 0.5).max(0.5);
        let x0 = (centre.x - r).floor().max(0.0);
        let y0 = (centre.y - r).floor().max(0.0);
        let x1 = (centre.x + r).ceil().min(f64::from(self.pixels.width()));
        let y1 = (centre.y + r).ceil().min(f64::from(self.pixels.height()));

        let mut y = y0;
        while y < y1 {
            let mut x = x0;
            while x < x1 {
                let dx = x + 0.5 - centre.x;
                let dy = y + 0.5 - centre.y;
                if dx * dx + dy * dy <= r * r {
                    self.put(x as u32, y as u32, colour);
                }
                x += 1.0;
            }
            y += 1.0;
        }

        if centre.x >= 0.0 && centre.y >= 0.0 {
            self.put(centre.x as u32, centre.y as u32, colour);
        }
    }

    /// Stamp discs along `from → to` closely enough that throttled pointer samples still
    /// yield a connected stroke.
    pub fn stroke_segment(&mut self, from: Point, to: Point, width: f64, colour: [u8; 4]) {
        let spacing = (width * 0.5).max(0.5);
        let len = from.distance(to);
        let steps = (len / spacing).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.stamp_brush(from.lerp(to, t), width, colour);
        }
    }

    /// Fill the closed polygon through `points` (pixel centres inside are covered).
    pub fn fill_polygon(&mut self, points: &[Point], colour: [u8; 4]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.stamp_brush(*first, 1.0, colour);
            return;
        }

        let mut path = BezPath::new();
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();

        let bbox = path.bounding_box();
        let x0 = bbox.x0.floor().max(0.0) as u32;
        let y0 = bbox.y0.floor().max(0.0) as u32;
        let x1 = (bbox.x1.ceil().max(0.0) as u32).min(self.pixels.width());
        let y1 = (bbox.y1.ceil().max(0.0) as u32).min(self.pixels.height());
        for y in y0..y1 {
            for x in x0..x1 {
                let centre = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if path.contains(centre) {
                    self.put(x, y, colour);
                }
            }
        }
        // Outline so degenerate (zero-area) polygons still mark something.
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], 1.0, colour);
        }
        self.stroke_segment(points[points.len() - 1], *first, 1.0, colour);
    }

    fn put(&mut self, x: u32, y: u32, colour: [u8; 4]) {
        if let Some(px) = self.pixels.pixel_mut(x, y) {
            *px = colour;
        }
    }
}

/// First polygon vertex when `pointer` lies within the snap radius of it. Needs at least
/// two placed vertices.
pub fn snap_to_start(pointer: Point, points: &[Point], radius_sq: f64) -> Option<Point> {
    if points.len() <= 1 {
        return None;
    }
    let start = points[0];
    ((pointer - start).hypot2() < radius_sq).then_some(start)
}

#[cfg(test)]
#[path = "../../tests/unit/labels/stroke.rs"]
mod tests;
