use super::*;

fn stacked(width: usize, height: usize, on_mask: usize) -> Vec<f32> {
    let plane = width * height;
    (0..MASKS_PER_RESPONSE * plane)
        .map(|i| if i / plane == on_mask { 1.0 } else { -1.0 })
        .collect()
}

#[test]
fn selected_mask_fills_with_class_colour() {
    let data = stacked(3, 2, 2);
    let out = render_mask(&data, 3, 2, 2, 4, None).unwrap();
    assert_eq!(out.size(), ImageSize::new(2, 3));
    for px in out.pixels() {
        assert_eq!(px, &[214, 39, 40, MASK_OPACITY]);
    }

    let other = render_mask(&data, 3, 2, 1, 4, None).unwrap();
    assert!(other.as_slice().iter().all(|&b| b == 0));
}

#[test]
fn threshold_is_strictly_positive() {
    let data = vec![0.0, 0.5, -0.1, 1e-6];
    let out = render_mask(&data, 2, 2, 0, 1, None).unwrap();
    let set: Vec<bool> = out.pixels().map(|p| p[3] != 0).collect();
    assert_eq!(set, vec![false, true, false, true]);
}

#[test]
fn reference_blocks_labelled_pixels() {
    let data = vec![1.0; 4];
    let reference = LabelBuffer::from_raw(ImageSize::new(2, 2), vec![0, 3, 0, 0]).unwrap();
    let out = render_mask(&data, 2, 2, 0, 2, Some(&reference)).unwrap();
    assert_eq!(out.pixel(1, 0), Some(&[0, 0, 0, 0]));
    assert_eq!(out.pixel(0, 1), Some(&[255, 127, 14, MASK_OPACITY]));
}

#[test]
fn reference_must_match_output_layout() {
    let data = vec![1.0; 6];
    let wrong = LabelBuffer::new(ImageSize::new(3, 2)).unwrap();
    assert!(matches!(
        render_mask(&data, 3, 2, 0, 1, Some(&wrong)),
        Err(SegcanvasError::DimensionMismatch(_))
    ));
    let right = LabelBuffer::new(ImageSize::new(2, 3)).unwrap();
    assert!(render_mask(&data, 3, 2, 0, 1, Some(&right)).is_ok());
}

#[test]
fn out_of_range_mask_is_unsupported() {
    let data = vec![1.0; 8];
    assert!(matches!(
        render_mask(&data, 2, 2, 2, 1, None),
        Err(SegcanvasError::UnsupportedSource(_))
    ));
}

#[test]
fn tensor_shape_validation() {
    let t = MaskTensor::from_shape(&[1, 4, 2, 3], stacked(2, 3, 0)).unwrap();
    assert_eq!((t.masks(), t.rows(), t.cols()), (4, 2, 3));
    assert!(MaskTensor::from_shape(&[4, 2, 3], vec![0.0; 24]).is_ok());
    assert!(matches!(
        MaskTensor::from_shape(&[4, 2, 3], vec![0.0; 23]),
        Err(SegcanvasError::UnsupportedSource(_))
    ));
    assert!(matches!(
        MaskTensor::from_shape(&[2, 3], vec![0.0; 6]),
        Err(SegcanvasError::UnsupportedSource(_))
    ));

    let out = t.render(0, 1, None).unwrap();
    assert_eq!(out.size(), ImageSize::new(3, 2));
    assert!(t.render(4, 1, None).is_err());
}

#[test]
fn class_colourization_leaves_background_transparent() {
    let labels = LabelBuffer::from_raw(ImageSize::new(3, 1), vec![0, 1, 6]).unwrap();
    let out = render_classes(&labels, 153).unwrap();
    assert_eq!(out.pixel(0, 0), Some(&[0, 0, 0, 0]));
    assert_eq!(out.pixel(1, 0), Some(&[31, 119, 180, 153]));
    assert_eq!(out.pixel(2, 0), Some(&[140, 86, 75, 153]));
}

#[test]
fn mask_cycle_skips_zero() {
    assert_eq!(next_mask_index(0), 1);
    assert_eq!(next_mask_index(1), 2);
    assert_eq!(next_mask_index(2), 3);
    assert_eq!(next_mask_index(3), 1);
}
