//! Splitting oversized rasters into a grid of bounded tiles, and the label buffer
//! scatter/gather that has to agree with it pixel for pixel.

use crate::{
    foundation::core::{ImageSize, LabelBuffer, RasterImage},
    foundation::error::{SegcanvasError, SegcanvasResult},
};

/// Default maximum tile side, matching the model and canvas working resolution.
pub const MAX_TILE: u32 = 1024;

/// One tile of a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct TileRect {
    /// Left edge in source pixels.
    pub origin_x: u32,
    /// Top edge in source pixels.
    pub origin_y: u32,
    /// Tile width.
    pub width: u32,
    /// Tile height.
    pub height: u32,
}

impl TileRect {
    /// Tile dimensions.
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }
}

/// Where a source pixel lives after tiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileLocation {
    /// Row-major tile index (`column + columns * row`).
    pub index: usize,
    /// X inside the tile.
    pub local_x: u32,
    /// Y inside the tile.
    pub local_y: u32,
}

/// Grid layout of a tiled source image. Computed once at load time, immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TileIndex {
    source: ImageSize,
    columns: u32,
    rows: u32,
    // Column/row start offsets with the source extent appended.
    col_edges: Vec<u32>,
    row_edges: Vec<u32>,
    tiles: Vec<TileRect>,
}

/// Whether an image of `size` exceeds `max_tile` on either side.
pub fn needs_tiling(size: ImageSize, max_tile: u32) -> bool {
    size.width > max_tile || size.height > max_tile
}

/// Grid of `ceil(w / max_tile) x ceil(h / max_tile)` tiles covering the source exactly.
///
/// Edges sit at `floor(i * extent / count)`, so when the extent divides evenly every tile
/// is `extent / count` wide and otherwise neighbouring tiles differ by at most one pixel.
/// All tiles of a column share a width and all tiles of a row share a height.
pub fn compute_grid(width: u32, height: u32, max_tile: u32) -> SegcanvasResult<TileIndex> {
    if width == 0 || height == 0 {
        return Err(SegcanvasError::unsupported(format!(
            "cannot tile an empty {width}x{height} image"
        )));
    }
    if max_tile == 0 {
        return Err(SegcanvasError::validation("max_tile must be > 0"));
    }

    let columns = width.div_ceil(max_tile);
    let rows = height.div_ceil(max_tile);
    let col_edges = axis_edges(width, columns);
    let row_edges = axis_edges(height, rows);

    let mut tiles = Vec::with_capacity((columns as usize) * (rows as usize));
    for r in row_edges.windows(2) {
        for c in col_edges.windows(2) {
            tiles.push(TileRect {
                origin_x: c[0],
                origin_y: r[0],
                width: c[1] - c[0],
                height: r[1] - r[0],
            });
        }
    }

    Ok(TileIndex {
        source: ImageSize::new(width, height),
        columns,
        rows,
        col_edges,
        row_edges,
        tiles,
    })
}

fn axis_edges(extent: u32, count: u32) -> Vec<u32> {
    (0..=count)
        .map(|i| ((u64::from(i) * u64::from(extent)) / u64::from(count)) as u32)
        .collect()
}

impl TileIndex {
    /// Size of the untiled source.
    pub fn source(&self) -> ImageSize {
        self.source
    }

    /// Number of tile columns.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile count.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false: a grid has at least one tile.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in row-major order.
    pub fn tiles(&self) -> &[TileRect] {
        &self.tiles
    }

    /// Tile by row-major index.
    pub fn tile(&self, index: usize) -> Option<&TileRect> {
        self.tiles.get(index)
    }

    /// Row-major index of tile `(column, row)`.
    pub fn linear_index(&self, column: u32, row: u32) -> usize {
        column as usize + (self.columns as usize) * (row as usize)
    }

    /// Tile and tile-local coordinate of source pixel `(x, y)`.
    pub fn locate(&self, x: u32, y: u32) -> Option<TileLocation> {
        if !self.source.contains(x, y) {
            return None;
        }
        let col = edge_slot(&self.col_edges, x);
        let row = edge_slot(&self.row_edges, y);
        Some(TileLocation {
            index: self.linear_index(col, row),
            local_x: x - self.col_edges[col as usize],
            local_y: y - self.row_edges[row as usize],
        })
    }

    fn slots(edges: &[u32], extent: u32) -> Vec<u32> {
        (0..extent).map(|v| edge_slot(edges, v)).collect()
    }
}

fn edge_slot(edges: &[u32], v: u32) -> u32 {
    // edges[0] == 0 <= v, so the partition point is at least 1.
    (edges.partition_point(|&e| e <= v) - 1) as u32
}

/// Crop every tile out of `image`, in row-major order.
#[tracing::instrument(skip(image, index), fields(source = %image.size(), tiles = index.len()))]
pub fn split_image(image: &RasterImage, index: &TileIndex) -> SegcanvasResult<Vec<RasterImage>> {
    if image.size() != index.source {
        return Err(SegcanvasError::dimension_mismatch(format!(
            "image is {} but the grid was computed for {}",
            image.size(),
            index.source
        )));
    }
    index
        .tiles
        .iter()
        .map(|t| image.crop(t.origin_x, t.origin_y, t.size()))
        .collect()
}

/// Scatter a full-resolution label source into one label buffer per tile.
///
/// Each source pixel is routed through [`TileIndex::locate`], so the result matches
/// [`split_image`] on the same grid exactly.
#[tracing::instrument(skip(flat, index), fields(source = %flat.size(), tiles = index.len()))]
pub fn split_label_buffer(flat: &LabelBuffer, index: &TileIndex) -> SegcanvasResult<Vec<LabelBuffer>> {
    if flat.size() != index.source {
        return Err(SegcanvasError::dimension_mismatch(format!(
            "label source is {} but the grid was computed for {}",
            flat.size(),
            index.source
        )));
    }

    let mut out = index
        .tiles
        .iter()
        .map(|t| LabelBuffer::new(t.size()))
        .collect::<SegcanvasResult<Vec<_>>>()?;

    let col_of = TileIndex::slots(&index.col_edges, index.source.width);
    let row_of = TileIndex::slots(&index.row_edges, index.source.height);
    let src = flat.as_slice();
    let width = index.source.width as usize;

    for (y, &row) in row_of.iter().enumerate() {
        let local_y = y as u32 - index.row_edges[row as usize];
        for (x, &col) in col_of.iter().enumerate() {
            let tile = &mut out[index.linear_index(col, row)];
            let local_x = x as u32 - index.col_edges[col as usize];
            tile.set_class(local_x, local_y, src[y * width + x]);
        }
    }
    Ok(out)
}

/// Reassemble per-tile label buffers into one buffer over the whole source.
pub fn merge_label_tiles(tiles: &[LabelBuffer], index: &TileIndex) -> SegcanvasResult<LabelBuffer> {
    if tiles.len() != index.len() {
        return Err(SegcanvasError::dimension_mismatch(format!(
            "grid has {} tiles, got {} label buffers",
            index.len(),
            tiles.len()
        )));
    }
    let mut out = LabelBuffer::new(index.source)?;
    for (rect, tile) in index.tiles.iter().zip(tiles) {
        if tile.size() != rect.size() {
            return Err(SegcanvasError::dimension_mismatch(format!(
                "tile at ({}, {}) is {} but labels are {}",
                rect.origin_x,
                rect.origin_y,
                rect.size(),
                tile.size()
            )));
        }
        out.blit(tile, rect.origin_x, rect.origin_y)?;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/tiling/grid.rs"]
mod tests;
