use super::*;

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn to_native_matches_closed_form() {
    let vp = ViewportState::new(Vec2::new(30.0, -12.0), 2.5);
    let p = to_native(Point::new(80.0, 13.0), &vp);
    assert!(close(p, Point::new((80.0 - 30.0) / 2.5, (13.0 + 12.0) / 2.5)));
}

#[test]
fn to_native_is_not_clamped() {
    let vp = ViewportState::new(Vec2::new(100.0, 100.0), 1.0);
    let p = to_native(Point::new(0.0, 0.0), &vp);
    assert!(close(p, Point::new(-100.0, -100.0)));
}

#[test]
fn canvas_native_roundtrip_across_zoom_range() {
    let offsets = [Vec2::ZERO, Vec2::new(-350.5, 12.25), Vec2::new(1e4, -7.0)];
    let zooms = [MIN_ZOOM, 0.35, 1.0, 3.3, MAX_ZOOM];
    let points = [Point::new(0.0, 0.0), Point::new(511.5, 1023.0), Point::new(-40.0, 9.75)];
    for offset in offsets {
        for zoom in zooms {
            let vp = ViewportState::new(offset, zoom);
            for p in points {
                assert!(close(to_canvas(to_native(p, &vp), &vp), p));
            }
        }
    }
}

#[test]
fn draw_rect_scales_destination_only() {
    let vp = ViewportState::new(Vec2::new(5.0, 7.0), 0.5);
    let r = to_canvas_draw_rect(&vp, ImageSize::new(1024, 512));
    assert_eq!(r, Rect::new(5.0, 7.0, 5.0 + 512.0, 7.0 + 256.0));

    // The rect's scale/offset inverts to_native.
    let c = Point::new(100.0, 40.0);
    let n = to_native(c, &vp);
    let back = Point::new(r.x0 + n.x * (r.width() / 1024.0), r.y0 + n.y * (r.height() / 512.0));
    assert!(close(back, c));
}

#[test]
fn recenter_keeps_pointer_anchored() {
    let old = ViewportState::new(Vec2::new(13.0, -4.0), 1.7);
    let pointer = Point::new(300.0, 220.0);
    for new_zoom in [MIN_ZOOM, 0.8, 1.8, 6.0, MAX_ZOOM] {
        let offset = recenter_zoom(old.zoom(), new_zoom, pointer, old.offset);
        let new = ViewportState::new(offset, new_zoom);
        assert!(close(to_native(pointer, &new), to_native(pointer, &old)));
    }
}

#[test]
fn zoom_at_steps_and_clamps() {
    let vp = ViewportState::default();
    let pointer = Point::new(64.0, 64.0);

    let zoomed_in = vp.zoom_at(-120.0, ZOOM_STEP, pointer);
    assert!((zoomed_in.zoom() - 1.1).abs() < 1e-12);
    assert!(close(to_native(pointer, &zoomed_in), to_native(pointer, &vp)));

    let zoomed_out = vp.zoom_at(120.0, ZOOM_STEP, pointer);
    assert!((zoomed_out.zoom() - 0.9).abs() < 1e-12);

    let unchanged = vp.zoom_at(0.0, ZOOM_STEP, pointer);
    assert_eq!(unchanged, vp);

    let mut far = vp;
    for _ in 0..200 {
        far = far.zoom_at(-1.0, ZOOM_STEP, pointer);
    }
    assert_eq!(far.zoom(), MAX_ZOOM);
    for _ in 0..400 {
        far = far.zoom_at(1.0, ZOOM_STEP, pointer);
    }
    assert_eq!(far.zoom(), MIN_ZOOM);
}

#[test]
fn construction_clamps_zoom() {
    assert_eq!(ViewportState::new(Vec2::ZERO, 0.0).zoom(), MIN_ZOOM);
    assert_eq!(ViewportState::new(Vec2::ZERO, 99.0).zoom(), MAX_ZOOM);
    assert_eq!(ViewportState::new(Vec2::ZERO, f64::NAN).zoom(), 1.0);
}

#[test]
fn deserialize_clamps_zoom() {
    let vp: ViewportState =
        serde_json::from_str(r#"{"offset":{"x":1.0,"y":2.0},"zoom":50.0}"#).unwrap();
    assert_eq!(vp.zoom(), MAX_ZOOM);
    assert_eq!(vp.offset, Vec2::new(1.0, 2.0));
}

#[test]
fn pan_is_inversely_scaled_and_unclamped() {
    let vp = ViewportState::new(Vec2::ZERO, 2.0);
    let up = vp.pan(PanDirection::Up, PAN_STEP);
    assert_eq!(up.offset, Vec2::new(0.0, -10.0));
    let right = vp.pan(PanDirection::Right, PAN_STEP);
    assert_eq!(right.offset, Vec2::new(10.0, 0.0));

    let slow = ViewportState::new(Vec2::ZERO, 0.5).pan(PanDirection::Left, PAN_STEP);
    assert_eq!(slow.offset, Vec2::new(-40.0, 0.0));
}

#[test]
fn pan_keys() {
    assert_eq!(PanDirection::from_key("w"), Some(PanDirection::Up));
    assert_eq!(PanDirection::from_key("ArrowDown"), Some(PanDirection::Down));
    assert_eq!(PanDirection::from_key("a"), Some(PanDirection::Left));
    assert_eq!(PanDirection::from_key("ArrowRight"), Some(PanDirection::Right));
    assert_eq!(PanDirection::from_key("q"), None);
}
