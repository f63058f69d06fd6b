use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn gray_tiff(pages: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut enc = tiff::encoder::TiffEncoder::new(&mut cursor).unwrap();
        for (w, h, data) in pages {
            enc.write_image::<tiff::encoder::colortype::Gray8>(*w, *h, data)
                .unwrap();
        }
    }
    cursor.into_inner()
}

fn raster(width: u32, height: u32) -> RasterImage {
    RasterImage::from_rgba8(
        ImageSize::new(width, height),
        vec![0; (width * height * 4) as usize],
    )
    .unwrap()
}

#[test]
fn png_decodes_to_one_straight_rgba_frame() {
    let frames = decode_frames(&png_bytes(3, 2, [100, 50, 200, 128])).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].size(), ImageSize::new(3, 2));
    assert_eq!(frames[0].pixels().pixel(2, 1), Some(&[100, 50, 200, 128]));
}

#[test]
fn multipage_tiff_yields_every_page() {
    let bytes = gray_tiff(&[(2, 2, vec![0, 85, 170, 255]), (2, 2, vec![1, 2, 3, 4])]);
    let frames = decode_frames(&bytes).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].pixels().pixel(1, 0), Some(&[85, 85, 85, 255]));

    let labels = decode_label_frames(&bytes).unwrap();
    assert_eq!(labels[1].as_slice(), &[1, 2, 3, 4]);
}

#[test]
fn garbage_bytes_fail_with_context() {
    let err = decode_frames(b"not an image").unwrap_err();
    assert!(matches!(err, SegcanvasError::Other(_)));
    assert!(err.to_string().contains("decode image"));
}

#[test]
fn classification_covers_the_three_modes() {
    assert_eq!(classify_frames(&[raster(10, 10)], 8).unwrap(), SourceKind::Large);
    assert_eq!(classify_frames(&[raster(8, 8)], 8).unwrap(), SourceKind::Single);
    assert_eq!(
        classify_frames(&[raster(4, 4), raster(4, 4)], 8).unwrap(),
        SourceKind::Stack
    );
}

#[test]
fn classification_rejects_unsupported_sources() {
    for frames in [
        vec![],
        vec![raster(4, 4), raster(4, 5)],
        vec![raster(9, 4), raster(9, 4)],
    ] {
        assert!(matches!(
            classify_frames(&frames, 8),
            Err(SegcanvasError::UnsupportedSource(_))
        ));
    }
}
