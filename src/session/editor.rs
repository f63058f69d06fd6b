//! Explicit editing-session state and the commands that mutate it.
//!
//! Every command returns a [`Change`] naming the buffers a render step has to redraw.
//! Model and classifier calls never happen here: the session hands out tickets, the caller
//! runs the call, and the response comes back together with its ticket so results that
//! arrive after the context moved on can be dropped.

use std::time::Instant;

use crate::{
    assets::decode::{SourceKind, classify_frames, decode_frames, decode_label_frames},
    assets::export::{composite_labels, encode_label_tiff},
    boundary::classifier::{ClassifierOptions, ClassifierRequest, split_classifier_response},
    boundary::inference::{ImageEmbedding, InferenceRequest, ModelScale, PromptKind, PromptPoint},
    config::EditorConfig,
    foundation::core::{ImageSize, LabelBuffer, Point, RasterImage, RgbaBuffer, SegmentationBuffer},
    foundation::error::{SegcanvasError, SegcanvasResult},
    labels::compositor::{StrokeCommit, commit_paint, commit_stroke},
    labels::stroke::{AnimatedLayer, ERASE_COLOUR, covering_brush_width, snap_to_start},
    render::composite::flatten_layers,
    render::mask::{MaskTensor, next_mask_index, render_classes},
    render::palette::class_colour,
    session::throttle::Throttle,
    tiling::grid::{TileIndex, compute_grid, split_image, split_label_buffer},
    tiling::quantize::quantize_frames,
    view::viewport::{PanDirection, ViewportState, to_native},
};

/// Largest class id reachable from the keyboard.
pub const MAX_KEY_CLASS: u8 = 6;

/// Active labelling tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Model-assisted masks from prompt points.
    Smart,
    /// Click-placed polygons.
    Polygon,
    /// Freehand paint.
    #[default]
    Brush,
    /// Freehand erase.
    Erase,
}

/// Pointer button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left button.
    Primary,
    /// Right button.
    Secondary,
}

/// What a command changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Change {
    /// The displayed raster (load, tile switch).
    pub image: bool,
    /// The active label buffer.
    pub labels: bool,
    /// The active segmentation buffer.
    pub segmentation: bool,
    /// Zoom or pan.
    pub viewport: bool,
    /// The animated layer or mask preview.
    pub overlay: bool,
}

impl Change {
    /// Nothing changed.
    pub const NONE: Self = Self {
        image: false,
        labels: false,
        segmentation: false,
        viewport: false,
        overlay: false,
    };

    /// Everything changed.
    pub const ALL: Self = Self {
        image: true,
        labels: true,
        segmentation: true,
        viewport: true,
        overlay: true,
    };

    const OVERLAY: Self = Self {
        overlay: true,
        ..Self::NONE
    };

    const LABELS: Self = Self {
        labels: true,
        overlay: true,
        ..Self::NONE
    };

    /// True when nothing needs redrawing.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Result of a pointer command: what to redraw, and possibly a model call to run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    /// Buffers to redraw.
    pub change: Change,
    /// Inference to run for a live mask preview.
    pub ticket: Option<InferenceTicket>,
}

impl From<Change> for Outcome {
    fn from(change: Change) -> Self {
        Self {
            change,
            ticket: None,
        }
    }
}

/// A pending model call. Only the most recently issued ticket can land.
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceTicket {
    generation: u64,
    tile: usize,
    /// Request to hand to a [`crate::MaskPredictor`].
    pub request: InferenceRequest,
}

impl InferenceTicket {
    /// Tile the request was issued for.
    pub fn tile(&self) -> usize {
        self.tile
    }
}

/// A pending classifier call. Stale once a different source is loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifierTicket {
    load_generation: u64,
    sizes: Vec<ImageSize>,
    /// Request to hand to a [`crate::Classifier`].
    pub request: ClassifierRequest,
}

/// One independently edited image: a single raster, one stack frame, or one tile.
#[derive(Clone, Debug)]
pub struct TileSurface {
    image: RasterImage,
    labels: LabelBuffer,
    segmentation: SegmentationBuffer,
    viewport: ViewportState,
    embedding: Option<ImageEmbedding>,
}

impl TileSurface {
    fn new(image: RasterImage) -> SegcanvasResult<Self> {
        let size = image.size();
        Ok(Self {
            image,
            labels: LabelBuffer::new(size)?,
            segmentation: SegmentationBuffer::empty(size)?,
            viewport: ViewportState::default(),
            embedding: None,
        })
    }

    /// Displayed raster.
    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Committed labels.
    pub fn labels(&self) -> &LabelBuffer {
        &self.labels
    }

    /// Latest classifier output.
    pub fn segmentation(&self) -> &SegmentationBuffer {
        &self.segmentation
    }

    /// Zoom and pan of this surface.
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Encoder output, once computed.
    pub fn embedding(&self) -> Option<&ImageEmbedding> {
        self.embedding.as_ref()
    }
}

fn no_image() -> SegcanvasError {
    SegcanvasError::validation("no image loaded")
}

/// State of one editing session: loaded surfaces, tool state and pending-call bookkeeping.
#[derive(Debug)]
pub struct EditingSession {
    config: EditorConfig,
    kind: Option<SourceKind>,
    grid: Option<TileIndex>,
    surfaces: Vec<TileSurface>,
    active: usize,
    tool: Tool,
    class_id: u8,
    mask_index: usize,
    layer: AnimatedLayer,
    // Last canvas point of an in-progress brush/erase drag.
    drag: Option<Point>,
    polygon: Vec<Point>,
    mask: Option<MaskTensor>,
    preview: Option<RgbaBuffer>,
    throttle: Throttle,
    generation: u64,
    load_generation: u64,
}

impl EditingSession {
    /// Empty session.
    pub fn new(config: EditorConfig) -> SegcanvasResult<Self> {
        config.validate()?;
        Ok(Self {
            layer: AnimatedLayer::new(config.canvas)?,
            throttle: Throttle::new(config.throttle_interval()),
            config,
            kind: None,
            grid: None,
            surfaces: Vec::new(),
            active: 0,
            tool: Tool::default(),
            class_id: 1,
            mask_index: 0,
            drag: None,
            polygon: Vec::new(),
            mask: None,
            preview: None,
            generation: 0,
            load_generation: 0,
        })
    }

    /// Settings in use.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Mode of the loaded source.
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.kind
    }

    /// Tile grid of a large source.
    pub fn grid(&self) -> Option<&TileIndex> {
        self.grid.as_ref()
    }

    /// All surfaces (frames or tiles), in order.
    pub fn surfaces(&self) -> &[TileSurface] {
        &self.surfaces
    }

    /// Index of the surface being edited.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Surface being edited.
    pub fn active(&self) -> Option<&TileSurface> {
        self.surfaces.get(self.active)
    }

    /// Current tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Class painted by the next commit.
    pub fn class_id(&self) -> u8 {
        self.class_id
    }

    /// Mask shown from multi-mask model output.
    pub fn mask_index(&self) -> usize {
        self.mask_index
    }

    /// Canvas-space gesture layer.
    pub fn animated_layer(&self) -> &AnimatedLayer {
        &self.layer
    }

    /// Native-space mask preview awaiting commit.
    pub fn mask_preview(&self) -> Option<&RgbaBuffer> {
        self.preview.as_ref()
    }

    /// Vertices of the polygon being placed, in canvas coordinates.
    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    /// Decode `bytes` and load every frame; see [`EditingSession::load`].
    pub fn load_bytes(&mut self, bytes: &[u8]) -> SegcanvasResult<Change> {
        let frames = decode_frames(bytes)?;
        self.load(frames)
    }

    /// Replace the loaded source.
    ///
    /// A large frame is split into tiles. Loading a second large image while one is
    /// active fails with [`SegcanvasError::TiledImageActive`]; call
    /// [`EditingSession::close`] first.
    #[tracing::instrument(skip(self, frames), fields(frames = frames.len()))]
    pub fn load(&mut self, frames: Vec<RasterImage>) -> SegcanvasResult<Change> {
        let kind = classify_frames(&frames, self.config.max_tile)?;
        if kind == SourceKind::Large && self.kind == Some(SourceKind::Large) {
            tracing::warn!("rejected large image: a tiled image is already loaded");
            return Err(SegcanvasError::TiledImageActive);
        }

        let (grid, images) = if kind == SourceKind::Large {
            let large = frames
                .first()
                .ok_or_else(|| SegcanvasError::unsupported("source has no frames"))?;
            let grid = compute_grid(large.width(), large.height(), self.config.max_tile)?;
            let tiles = split_image(large, &grid)?;
            (Some(grid), tiles)
        } else {
            (None, frames)
        };
        let surfaces = images
            .into_iter()
            .map(TileSurface::new)
            .collect::<SegcanvasResult<Vec<_>>>()?;
        tracing::debug!(?kind, surfaces = surfaces.len(), "loaded source");

        self.kind = Some(kind);
        self.grid = grid;
        self.surfaces = surfaces;
        self.active = 0;
        self.load_generation += 1;
        self.reset_gesture();
        Ok(Change::ALL)
    }

    /// Drop the loaded source.
    pub fn close(&mut self) -> Change {
        self.kind = None;
        self.grid = None;
        self.surfaces.clear();
        self.active = 0;
        self.load_generation += 1;
        self.reset_gesture();
        Change::ALL
    }

    /// Make surface `index` the one being edited.
    pub fn switch_tile(&mut self, index: usize) -> SegcanvasResult<Change> {
        if index >= self.surfaces.len() {
            return Err(SegcanvasError::validation(format!(
                "tile {index} out of range for {} surfaces",
                self.surfaces.len()
            )));
        }
        if index == self.active {
            return Ok(Change::NONE);
        }
        self.active = index;
        self.reset_gesture();
        Ok(Change::ALL)
    }

    /// Change tool. Discards any gesture in progress and invalidates pending model calls.
    pub fn set_tool(&mut self, tool: Tool) -> Change {
        self.tool = tool;
        self.reset_gesture();
        Change::OVERLAY
    }

    /// Select the class painted by later commits. A pending mask preview is recoloured.
    pub fn set_class(&mut self, class_id: u8) -> SegcanvasResult<Change> {
        if class_id == 0 {
            return Err(SegcanvasError::validation("class 0 is reserved for unlabelled"));
        }
        self.class_id = class_id;
        self.render_preview()
    }

    /// Attach the encoder output for surface `index`.
    pub fn set_embedding(&mut self, index: usize, embedding: ImageEmbedding) -> SegcanvasResult<()> {
        let surface = self.surfaces.get_mut(index).ok_or_else(no_image)?;
        surface.embedding = Some(embedding);
        Ok(())
    }

    /// One scroll tick at `pointer`. Any gesture in progress is dropped.
    pub fn scroll_zoom(&mut self, delta_y: f64, pointer: Point) -> SegcanvasResult<Change> {
        let step = self.config.zoom_step;
        let surface = self.surfaces.get_mut(self.active).ok_or_else(no_image)?;
        surface.viewport = surface.viewport.zoom_at(delta_y, step, pointer);
        self.reset_gesture();
        Ok(Change {
            viewport: true,
            overlay: true,
            ..Change::NONE
        })
    }

    /// Keyboard shortcuts: `1`..=`6` pick a class, `Escape` discards the gesture, W/A/S/D
    /// and arrow keys pan (also discarding the gesture). Other keys are ignored.
    pub fn key_press(&mut self, key: &str) -> SegcanvasResult<Change> {
        if let Ok(class_id) = key.parse::<u8>() {
            if (1..=MAX_KEY_CLASS).contains(&class_id) {
                return self.set_class(class_id);
            }
            return Ok(Change::NONE);
        }
        if key == "Escape" {
            self.reset_gesture();
            return Ok(Change::OVERLAY);
        }
        let Some(direction) = PanDirection::from_key(key) else {
            return Ok(Change::NONE);
        };
        let step = self.config.pan_step;
        let surface = self.surfaces.get_mut(self.active).ok_or_else(no_image)?;
        surface.viewport = surface.viewport.pan(direction, step);
        self.reset_gesture();
        Ok(Change {
            viewport: true,
            overlay: true,
            ..Change::NONE
        })
    }

    /// Pointer pressed at canvas point `canvas`.
    pub fn pointer_down(&mut self, button: PointerButton, canvas: Point) -> Change {
        if self.surfaces.is_empty() || button != PointerButton::Primary {
            return Change::NONE;
        }
        match self.tool {
            Tool::Brush | Tool::Erase => {
                self.drag = Some(canvas);
                let colour = self.stroke_colour();
                let width = self.brush_width();
                self.layer.stamp_brush(canvas, width, colour);
                Change::OVERLAY
            }
            Tool::Smart | Tool::Polygon => Change::NONE,
        }
    }

    /// Pointer moved to canvas point `canvas` at time `now`. Throttled.
    pub fn pointer_move(&mut self, now: Instant, canvas: Point) -> SegcanvasResult<Outcome> {
        if self.surfaces.is_empty() {
            return Ok(Outcome::default());
        }
        if !self.throttle.ready(now) {
            tracing::debug!("pointer sample throttled");
            return Ok(Outcome::default());
        }
        match self.tool {
            Tool::Brush | Tool::Erase => {
                let Some(last) = self.drag else {
                    return Ok(Outcome::default());
                };
                let colour = self.stroke_colour();
                let width = self.brush_width();
                self.layer.stroke_segment(last, canvas, width, colour);
                self.drag = Some(canvas);
                Ok(Change::OVERLAY.into())
            }
            Tool::Smart => Ok(Outcome {
                change: Change::NONE,
                ticket: self.prompt_at(canvas, PromptKind::Positive)?,
            }),
            Tool::Polygon => {
                if self.polygon.is_empty() {
                    return Ok(Outcome::default());
                }
                self.draw_polygon_outline(Some(canvas));
                Ok(Change::OVERLAY.into())
            }
        }
    }

    /// Pointer released at canvas point `canvas`: commits brush/erase strokes, commits or
    /// cycles mask previews, and places or closes polygons.
    pub fn pointer_up(&mut self, button: PointerButton, canvas: Point) -> SegcanvasResult<Change> {
        if self.surfaces.is_empty() {
            return Ok(Change::NONE);
        }
        match (self.tool, button) {
            (Tool::Brush, PointerButton::Primary) => self.commit_drag(StrokeCommit::Paint(self.class_id)),
            (Tool::Erase, PointerButton::Primary) => self.commit_drag(StrokeCommit::Erase),
            (Tool::Smart, PointerButton::Primary) => self.commit_preview(),
            (Tool::Smart, PointerButton::Secondary) => self.cycle_mask_index(),
            (Tool::Polygon, PointerButton::Primary) => {
                match snap_to_start(canvas, &self.polygon, self.config.snap_radius_sq) {
                    Some(_) => self.finish_polygon(),
                    None => {
                        self.polygon.push(canvas);
                        self.draw_polygon_outline(None);
                        Ok(Change::OVERLAY)
                    }
                }
            }
            (Tool::Polygon, PointerButton::Secondary) => {
                self.polygon.push(canvas);
                self.finish_polygon()
            }
            (Tool::Brush | Tool::Erase, PointerButton::Secondary) => Ok(Change::NONE),
        }
    }

    /// Pointer left the canvas: drop whatever is being drawn.
    pub fn pointer_leave(&mut self) -> Change {
        self.reset_gesture();
        Change::OVERLAY
    }

    /// Ticket for a model call with a single prompt at canvas point `canvas`.
    ///
    /// `None` until the active surface has an embedding. Issuing a ticket invalidates every
    /// earlier one.
    pub fn prompt_at(
        &mut self,
        canvas: Point,
        kind: PromptKind,
    ) -> SegcanvasResult<Option<InferenceTicket>> {
        let surface = self.surfaces.get(self.active).ok_or_else(no_image)?;
        let Some(embedding) = surface.embedding.clone() else {
            tracing::debug!(tile = self.active, "no embedding yet; prompt skipped");
            return Ok(None);
        };
        let native = to_native(canvas, &surface.viewport);
        let request = InferenceRequest {
            points: vec![PromptPoint {
                x: native.x,
                y: native.y,
                kind,
            }],
            embedding,
            model_scale: ModelScale::for_size(surface.image.size())?,
        };
        self.generation += 1;
        Ok(Some(InferenceTicket {
            generation: self.generation,
            tile: self.active,
            request,
        }))
    }

    /// Show the model output for `ticket` as a mask preview.
    ///
    /// Results for superseded tickets, or issued before a tool/tile switch, are dropped.
    pub fn apply_mask(&mut self, ticket: &InferenceTicket, tensor: MaskTensor) -> SegcanvasResult<Change> {
        if ticket.generation != self.generation || ticket.tile != self.active {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale inference result"
            );
            return Ok(Change::NONE);
        }
        self.mask = Some(tensor);
        self.render_preview()
    }

    /// Paint the mask preview into the active labels.
    pub fn commit_preview(&mut self) -> SegcanvasResult<Change> {
        let Some(preview) = self.preview.take() else {
            return Ok(Change::NONE);
        };
        self.mask = None;
        let surface = self.surfaces.get_mut(self.active).ok_or_else(no_image)?;
        surface.labels = commit_paint(&preview, &surface.labels, self.class_id)?;
        Ok(Change::LABELS)
    }

    /// Show the next mask of the last model output (`1 → 2 → 3 → 1`).
    pub fn cycle_mask_index(&mut self) -> SegcanvasResult<Change> {
        self.mask_index = next_mask_index(self.mask_index);
        self.render_preview()
    }

    /// Ticket for a classifier call over every surface. With `train`, labels are sent too.
    #[tracing::instrument(skip(self))]
    pub fn classifier_ticket(
        &self,
        train: bool,
        options: ClassifierOptions,
    ) -> SegcanvasResult<ClassifierTicket> {
        let kind = self.kind.ok_or_else(no_image)?;
        let images: Vec<RasterImage> = self.surfaces.iter().map(|s| s.image.clone()).collect();
        let labels: Vec<LabelBuffer> = self.surfaces.iter().map(|s| s.labels.clone()).collect();
        let request = ClassifierRequest::new(
            &images,
            train.then_some(labels.as_slice()),
            kind,
            self.grid.as_ref().map(TileIndex::source),
            options,
        )?;
        Ok(ClassifierTicket {
            load_generation: self.load_generation,
            sizes: self.surfaces.iter().map(|s| s.image.size()).collect(),
            request,
        })
    }

    /// Store a classifier response. Responses for a previously loaded source are dropped.
    pub fn apply_segmentations(&mut self, ticket: &ClassifierTicket, bytes: &[u8]) -> SegcanvasResult<Change> {
        if ticket.load_generation != self.load_generation {
            tracing::debug!("discarding stale classifier result");
            return Ok(Change::NONE);
        }
        let segs = split_classifier_response(bytes, &ticket.sizes)?;
        for (surface, seg) in self.surfaces.iter_mut().zip(segs) {
            surface.segmentation = seg;
        }
        Ok(Change {
            segmentation: true,
            ..Change::NONE
        })
    }

    /// Replace every surface's labels with an imported grey-level label file.
    ///
    /// Large sources take one full-size frame that is split over the tiles; other sources
    /// take one frame per surface.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn import_labels(&mut self, bytes: &[u8]) -> SegcanvasResult<Change> {
        if self.surfaces.is_empty() {
            return Err(no_image());
        }
        let frames = quantize_frames(&decode_label_frames(bytes)?)?;
        let per_surface = match &self.grid {
            Some(grid) => {
                let [flat] = frames.as_slice() else {
                    return Err(SegcanvasError::dimension_mismatch(format!(
                        "large image expects one label frame, got {}",
                        frames.len()
                    )));
                };
                split_label_buffer(flat, grid)?
            }
            None => frames,
        };
        if per_surface.len() != self.surfaces.len() {
            return Err(SegcanvasError::dimension_mismatch(format!(
                "{} label frames for {} images",
                per_surface.len(),
                self.surfaces.len()
            )));
        }
        for (surface, labels) in self.surfaces.iter().zip(&per_surface) {
            surface.labels.ensure_same_size(labels, "imported labels")?;
        }
        for (surface, labels) in self.surfaces.iter_mut().zip(per_surface) {
            surface.labels = labels;
        }
        self.reset_gesture();
        Ok(Change::LABELS)
    }

    /// Encode every surface's labels as a grey-level TIFF in the source's layout.
    #[tracing::instrument(skip(self))]
    pub fn export_labels(&self) -> SegcanvasResult<Vec<u8>> {
        let kind = self.kind.ok_or_else(no_image)?;
        let labels: Vec<LabelBuffer> = self.surfaces.iter().map(|s| s.labels.clone()).collect();
        let frames = composite_labels(kind, &labels, self.grid.as_ref(), self.config.rescale)?;
        encode_label_tiff(&frames)
    }

    /// Encode every surface's classifier output as a grey-level TIFF, laid out like
    /// [`EditingSession::export_labels`]. Surfaces never segmented export as zeros.
    #[tracing::instrument(skip(self))]
    pub fn export_segmentation(&self) -> SegcanvasResult<Vec<u8>> {
        let kind = self.kind.ok_or_else(no_image)?;
        let classes: Vec<LabelBuffer> = self
            .surfaces
            .iter()
            .map(|s| s.segmentation.classes().clone())
            .collect();
        let frames = composite_labels(kind, &classes, self.grid.as_ref(), self.config.rescale)?;
        encode_label_tiff(&frames)
    }

    /// Flattened native-resolution view of the active surface: image, segmentation,
    /// labels and any mask preview.
    pub fn render_active(&self) -> SegcanvasResult<RgbaBuffer> {
        let surface = self.surfaces.get(self.active).ok_or_else(no_image)?;
        let seg = render_classes(surface.segmentation.classes(), self.config.segmentation_opacity)?;
        let labels = render_classes(&surface.labels, self.config.label_opacity)?;
        let mut layers = vec![&seg, &labels];
        if let Some(preview) = &self.preview {
            layers.push(preview);
        }
        flatten_layers(&surface.image, &layers)
    }

    fn stroke_colour(&self) -> [u8; 4] {
        match self.tool {
            Tool::Erase => ERASE_COLOUR,
            _ => class_colour(self.class_id),
        }
    }

    fn brush_width(&self) -> f64 {
        let zoom = self
            .surfaces
            .get(self.active)
            .map_or(1.0, |s| s.viewport.zoom());
        covering_brush_width(self.config.brush_width, zoom)
    }

    fn commit_drag(&mut self, commit: StrokeCommit) -> SegcanvasResult<Change> {
        if self.drag.take().is_none() {
            return Ok(Change::NONE);
        }
        let surface = self.surfaces.get_mut(self.active).ok_or_else(no_image)?;
        surface.labels = commit_stroke(self.layer.pixels(), &surface.viewport, &surface.labels, commit)?;
        self.layer.clear();
        Ok(Change::LABELS)
    }

    fn finish_polygon(&mut self) -> SegcanvasResult<Change> {
        let points = std::mem::take(&mut self.polygon);
        self.layer.clear();
        self.layer.fill_polygon(&points, class_colour(self.class_id));
        let surface = self.surfaces.get_mut(self.active).ok_or_else(no_image)?;
        surface.labels = commit_stroke(
            self.layer.pixels(),
            &surface.viewport,
            &surface.labels,
            StrokeCommit::Paint(self.class_id),
        )?;
        self.layer.clear();
        Ok(Change::LABELS)
    }

    fn draw_polygon_outline(&mut self, pointer: Option<Point>) {
        self.layer.clear();
        let colour = class_colour(self.class_id);
        for pair in self.polygon.windows(2) {
            self.layer.stroke_segment(pair[0], pair[1], 1.0, colour);
        }
        if let (Some(last), Some(p)) = (self.polygon.last(), pointer) {
            self.layer.stroke_segment(*last, p, 1.0, colour);
        }
    }

    // Recolour/re-slice the cached model output. Falls back to mask 0 when the tensor has
    // fewer masks than the selected index.
    fn render_preview(&mut self) -> SegcanvasResult<Change> {
        let Some(mask) = &self.mask else {
            return Ok(Change::NONE);
        };
        let surface = self.surfaces.get(self.active).ok_or_else(no_image)?;
        let index = if self.mask_index < mask.masks() {
            self.mask_index
        } else {
            0
        };
        self.preview = Some(mask.render(index, self.class_id, Some(&surface.labels))?);
        Ok(Change::OVERLAY)
    }

    fn clear_canvas_layer(&mut self) {
        self.layer.clear();
        self.drag = None;
    }

    fn reset_gesture(&mut self) {
        self.clear_canvas_layer();
        self.polygon.clear();
        self.mask = None;
        self.preview = None;
        self.throttle.reset();
        self.generation += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
