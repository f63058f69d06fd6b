use super::*;

const RED: [u8; 4] = [214, 39, 40, 255];

fn set_count(layer: &AnimatedLayer) -> usize {
    layer
        .pixels()
        .pixels()
        .filter(|px| px.iter().any(|&c| c > 0))
        .count()
}

#[test]
fn width_one_brush_marks_the_pixel_under_the_pointer() {
    let mut layer = AnimatedLayer::new(ImageSize::new(8, 8)).unwrap();
    layer.stamp_brush(Point::new(3.2, 5.9), 1.0, RED);
    assert_eq!(layer.pixels().pixel(3, 5), Some(&RED));
    assert_eq!(set_count(&layer), 1);
}

#[test]
fn wide_brush_is_a_disc_clipped_to_canvas() {
    let mut layer = AnimatedLayer::new(ImageSize::new(16, 16)).unwrap();
    layer.stamp_brush(Point::new(8.0, 8.0), 6.0, RED);
    assert!(layer.pixels().pixel(8, 8).is_some_and(|p| *p == RED));
    assert!(layer.pixels().pixel(5, 8).is_some_and(|p| *p == RED));
    assert!(layer.pixels().pixel(5, 5).is_some_and(|p| *p == [0, 0, 0, 0]));

    let mut edge = AnimatedLayer::new(ImageSize::new(4, 4)).unwrap();
    edge.stamp_brush(Point::new(0.0, 0.0), 6.0, RED);
    assert!(set_count(&edge) > 0);
}

#[test]
fn stroke_segment_has_no_gaps() {
    let mut layer = AnimatedLayer::new(ImageSize::new(32, 4)).unwrap();
    layer.stroke_segment(Point::new(0.5, 1.5), Point::new(30.5, 1.5), 1.0, RED);
    for x in 0..=30 {
        assert_eq!(layer.pixels().pixel(x, 1), Some(&RED), "x={x}");
    }
}

#[test]
fn polygon_fill_covers_interior() {
    let mut layer = AnimatedLayer::new(ImageSize::new(10, 10)).unwrap();
    let square = [
        Point::new(2.0, 2.0),
        Point::new(6.0, 2.0),
        Point::new(6.0, 6.0),
        Point::new(2.0, 6.0),
    ];
    layer.fill_polygon(&square, RED);
    assert_eq!(layer.pixels().pixel(4, 4), Some(&RED));
    assert_eq!(layer.pixels().pixel(2, 2), Some(&RED));
    assert_eq!(layer.pixels().pixel(8, 8), Some(&[0, 0, 0, 0]));
}

#[test]
fn clear_resets_layer() {
    let mut layer = AnimatedLayer::new(ImageSize::new(4, 4)).unwrap();
    assert!(layer.is_blank());
    layer.stamp_brush(Point::new(1.0, 1.0), 1.0, ERASE_COLOUR);
    assert!(!layer.is_blank());
    layer.clear();
    assert!(layer.is_blank());
}

#[test]
fn snap_needs_two_vertices_and_proximity() {
    let start = Point::new(10.0, 10.0);
    assert_eq!(snap_to_start(start, &[start], SNAP_RADIUS_SQ), None);

    let pts = [start, Point::new(50.0, 10.0)];
    assert_eq!(snap_to_start(Point::new(20.0, 15.0), &pts, SNAP_RADIUS_SQ), Some(start));
    assert_eq!(snap_to_start(Point::new(30.0, 10.0), &pts, SNAP_RADIUS_SQ), None);
}

#[test]
fn brush_widens_only_when_zoomed_in() {
    assert_eq!(covering_brush_width(1.0, 1.0), 1.0);
    assert_eq!(covering_brush_width(3.0, 0.5), 3.0);
    assert_eq!(covering_brush_width(40.0, 5.0), 40.0);

    let w = covering_brush_width(1.0, 5.0);
    assert!(w > 5.0 * std::f64::consts::SQRT_2);
}
