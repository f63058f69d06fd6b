use super::*;
use crate::{assets::decode::decode_label_frames, foundation::core::ImageSize, tiling::grid::compute_grid};

fn labels(width: u32, height: u32, data: Vec<u8>) -> LabelBuffer {
    LabelBuffer::from_raw(ImageSize::new(width, height), data).unwrap()
}

#[test]
fn delta_spreads_classes_over_grey_range() {
    assert_eq!(export_delta(3, true), 85);
    assert_eq!(export_delta(6, true), 42);
    assert_eq!(export_delta(3, false), 1);
    assert_eq!(export_delta(0, true), 1);
}

#[test]
fn single_export_rescales() {
    let out = composite_labels(SourceKind::Single, &[labels(3, 1, vec![0, 1, 3])], None, true)
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].as_slice(), &[0, 85, 255]);
}

#[test]
fn stack_export_shares_one_delta() {
    let frames = [labels(2, 1, vec![1, 0]), labels(2, 1, vec![2, 4])];
    let out = composite_labels(SourceKind::Stack, &frames, None, true).unwrap();
    assert_eq!(out[0].as_slice(), &[63, 0]);
    assert_eq!(out[1].as_slice(), &[126, 252]);
}

#[test]
fn large_export_reassembles_tiles() {
    let grid = compute_grid(4, 2, 2).unwrap();
    let tiles = [labels(2, 2, vec![1, 1, 1, 1]), labels(2, 2, vec![0, 2, 0, 2])];
    let out = composite_labels(SourceKind::Large, &tiles, Some(&grid), false).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].as_slice(), &[1, 1, 0, 2, 1, 1, 0, 2]);

    assert!(matches!(
        composite_labels(SourceKind::Large, &tiles, None, false),
        Err(SegcanvasError::Validation(_))
    ));
}

#[test]
fn mode_shape_errors() {
    let a = labels(2, 1, vec![0, 0]);
    let b = labels(1, 2, vec![0, 0]);
    assert!(composite_labels(SourceKind::Single, &[a.clone(), a.clone()], None, true).is_err());
    assert!(matches!(
        composite_labels(SourceKind::Stack, &[a, b], None, true),
        Err(SegcanvasError::DimensionMismatch(_))
    ));
}

#[test]
fn encoded_tiff_decodes_back_to_grey_levels() {
    let frames = [labels(2, 2, vec![0, 85, 170, 255]), labels(2, 2, vec![255, 0, 0, 85])];
    let bytes = encode_label_tiff(&frames).unwrap();
    let back = decode_label_frames(&bytes).unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(back[0], frames[0]);
    assert_eq!(back[1], frames[1]);

    assert!(encode_label_tiff(&[]).is_err());
}
