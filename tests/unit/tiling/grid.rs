use super::*;

fn gradient(width: u32, height: u32) -> RasterImage {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255]);
        }
    }
    RasterImage::from_rgba8(ImageSize::new(width, height), data).unwrap()
}

#[test]
fn even_split_uses_equal_tiles() {
    let grid = compute_grid(2048, 1024, MAX_TILE).unwrap();
    assert_eq!((grid.columns(), grid.rows()), (2, 1));
    assert_eq!(grid.tiles()[0], TileRect { origin_x: 0, origin_y: 0, width: 1024, height: 1024 });
    assert_eq!(grid.tiles()[1], TileRect { origin_x: 1024, origin_y: 0, width: 1024, height: 1024 });
}

#[test]
fn small_image_is_a_single_tile() {
    let grid = compute_grid(640, 480, MAX_TILE).unwrap();
    assert_eq!(grid.len(), 1);
    assert_eq!(grid.tiles()[0].size(), ImageSize::new(640, 480));
    assert!(!needs_tiling(ImageSize::new(640, 480), MAX_TILE));
    assert!(needs_tiling(ImageSize::new(1025, 10), MAX_TILE));
}

#[test]
fn uneven_split_still_covers_every_pixel_once() {
    let grid = compute_grid(2500, 1100, MAX_TILE).unwrap();
    assert_eq!((grid.columns(), grid.rows()), (3, 2));

    let width_sum: u32 = grid.tiles()[..3].iter().map(|t| t.width).sum();
    let height_sum: u32 = grid.tiles().iter().step_by(3).map(|t| t.height).sum();
    assert_eq!(width_sum, 2500);
    assert_eq!(height_sum, 1100);

    for t in grid.tiles() {
        assert!(t.width <= MAX_TILE && t.height <= MAX_TILE);
        assert!(t.width >= 833 && t.width <= 834);
    }
}

#[test]
fn locate_matches_division_formula_when_exact() {
    let grid = compute_grid(2048, 2048, MAX_TILE).unwrap();
    let loc = grid.locate(1500, 200).unwrap();
    assert_eq!(loc, TileLocation { index: 1, local_x: 476, local_y: 200 });

    let loc = grid.locate(100, 1500).unwrap();
    assert_eq!(loc, TileLocation { index: 2, local_x: 100, local_y: 476 });

    assert_eq!(grid.locate(2048, 0), None);
}

#[test]
fn locate_agrees_with_tile_rects() {
    let grid = compute_grid(2500, 1100, MAX_TILE).unwrap();
    for &(x, y) in &[(0, 0), (832, 549), (833, 550), (1666, 0), (1667, 1099), (2499, 1099)] {
        let loc = grid.locate(x, y).unwrap();
        let t = grid.tile(loc.index).unwrap();
        assert_eq!(t.origin_x + loc.local_x, x);
        assert_eq!(t.origin_y + loc.local_y, y);
        assert!(loc.local_x < t.width && loc.local_y < t.height);
    }
}

#[test]
fn zero_sized_sources_are_rejected() {
    assert!(matches!(
        compute_grid(0, 100, MAX_TILE),
        Err(SegcanvasError::UnsupportedSource(_))
    ));
    assert!(matches!(
        compute_grid(100, 100, 0),
        Err(SegcanvasError::Validation(_))
    ));
}

#[test]
fn split_image_crops_in_row_major_order() {
    let image = gradient(10, 6);
    let grid = compute_grid(10, 6, 4).unwrap();
    let tiles = split_image(&image, &grid).unwrap();
    assert_eq!(tiles.len(), grid.len());

    for (tile, rect) in tiles.iter().zip(grid.tiles()) {
        assert_eq!(tile.size(), rect.size());
        assert_eq!(
            tile.pixels().pixel(0, 0),
            image.pixels().pixel(rect.origin_x, rect.origin_y)
        );
    }
}

#[test]
fn label_split_agrees_with_image_split() {
    let size = ImageSize::new(11, 7);
    let data: Vec<u8> = (0..size.pixel_count()).map(|i| (i % 7) as u8).collect();
    let flat = LabelBuffer::from_raw(size, data).unwrap();
    let grid = compute_grid(11, 7, 4).unwrap();

    let tiles = split_label_buffer(&flat, &grid).unwrap();
    for (tile, rect) in tiles.iter().zip(grid.tiles()) {
        let expected = flat.crop(rect.origin_x, rect.origin_y, rect.size()).unwrap();
        assert_eq!(tile, &expected);
    }

    let merged = merge_label_tiles(&tiles, &grid).unwrap();
    assert_eq!(merged, flat);
}

#[test]
fn split_rejects_mismatched_sources() {
    let grid = compute_grid(8, 8, 4).unwrap();
    let flat = LabelBuffer::new(ImageSize::new(8, 7)).unwrap();
    assert!(matches!(
        split_label_buffer(&flat, &grid),
        Err(SegcanvasError::DimensionMismatch(_))
    ));
    assert!(matches!(
        merge_label_tiles(&[], &grid),
        Err(SegcanvasError::DimensionMismatch(_))
    ));
}
