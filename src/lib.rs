//! segcanvas is the pixel core of an interactive raster-labelling editor.
//!
//! It keeps pointer, canvas, native-image and tile coordinates consistent while merging
//! brush strokes, polygons and model-predicted masks into per-pixel class labels:
//!
//! - [`ViewportState`] and [`to_native`] / [`to_canvas`] map between canvas and image
//! - [`commit_paint`], [`commit_erase`] and [`commit_stroke`] merge gestures into labels
//! - [`compute_grid`], [`split_image`] and [`split_label_buffer`] tile oversized images
//! - [`render_mask`] turns model output into a coloured overlay
//!
//! [`EditingSession`] ties these together for a front end, and the `segcanvas` binary
//! exposes tiling and label import/export headlessly.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod boundary;
mod config;
mod foundation;
mod labels;
mod render;
mod session;
mod tiling;
mod view;

pub use crate::foundation::core::{
    Affine, BezPath, ImageSize, LabelBuffer, PixelBuffer, Point, RasterImage, Rect,
    RgbaBuffer, SegmentationBuffer, Vec2,
};
pub use crate::foundation::error::{SegcanvasError, SegcanvasResult};

pub use crate::assets::decode::{SourceKind, classify_frames, decode_frames, decode_label_frames};
pub use crate::assets::export::{composite_labels, encode_label_tiff, export_delta};
pub use crate::boundary::classifier::{
    Classifier, ClassifierOptions, ClassifierRequest, split_classifier_response,
};
pub use crate::boundary::inference::{
    ImageEmbedding, InferenceRequest, MODEL_LONG_SIDE, MaskPredictor, ModelScale, PromptKind,
    PromptPoint,
};
pub use crate::config::EditorConfig;
pub use crate::labels::compositor::{
    StrokeCommit, commit_erase, commit_paint, commit_paint_with_reference, commit_stroke,
    is_pixel_set, reproject_to_native,
};
pub use crate::labels::stroke::{
    AnimatedLayer, ERASE_COLOUR, SNAP_RADIUS_SQ, covering_brush_width, snap_to_start,
};
pub use crate::render::composite::{StraightRgba8, flatten_layers, over, over_in_place};
pub use crate::render::mask::{
    MASK_OPACITY, MASKS_PER_RESPONSE, MaskTensor, next_mask_index, render_classes, render_mask,
};
pub use crate::render::palette::{CLASS_PALETTE, class_colour, rgba_to_hex, with_alpha};
pub use crate::session::editor::{
    Change, ClassifierTicket, EditingSession, InferenceTicket, MAX_KEY_CLASS, Outcome,
    PointerButton, TileSurface, Tool,
};
pub use crate::session::throttle::Throttle;
pub use crate::tiling::grid::{
    MAX_TILE, TileIndex, TileLocation, TileRect, compute_grid, merge_label_tiles, needs_tiling,
    split_image, split_label_buffer,
};
pub use crate::tiling::quantize::{intensity_delta, quantize_frames, quantize_intensities};
pub use crate::view::viewport::{
    MAX_ZOOM, MIN_ZOOM, PAN_STEP, PanDirection, ViewportState, ZOOM_STEP, clamp_zoom,
    recenter_zoom, to_canvas, to_canvas_draw_rect, to_native,
};
