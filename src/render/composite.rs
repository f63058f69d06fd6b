//! Straight-alpha "over" used to flatten the view stack (image, segmentation, labels,
//! live overlay) into one preview raster.

use crate::{
    foundation::core::{RasterImage, RgbaBuffer},
    foundation::error::SegcanvasResult,
    foundation::math::mul_div255_u8,
};

/// Straight (non-premultiplied) RGBA8 pixel.
pub type StraightRgba8 = [u8; 4];

/// Porter-Duff source-over on straight-alpha pixels, with `src` alpha scaled by `opacity`.
pub fn over(dst: StraightRgba8, src: StraightRgba8, opacity: u8) -> StraightRgba8 {
    let sa = mul_div255_u8(u16::from(src[3]), u16::from(opacity));
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return [src[0], src[1], src[2], 255];
    }

    let sa = u32::from(sa);
    let da = u32::from(dst[3]);
    // Destination weight, in 255ths of full coverage squared.
    let dw = da * (255 - sa);
    let out_a255 = sa * 255 + dw;
    if out_a255 == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * dw;
        out[i] = ((num + out_a255 / 2) / out_a255).min(255) as u8;
    }
    out[3] = ((out_a255 + 127) / 255).min(255) as u8;
    out
}

/// Composite `src` over `dst` pixel by pixel. Both buffers must share a size.
pub fn over_in_place(dst: &mut RgbaBuffer, src: &RgbaBuffer, opacity: u8) -> SegcanvasResult<()> {
    dst.ensure_same_size(src, "composite layer")?;
    for (d, s) in dst.as_mut_slice().chunks_exact_mut(4).zip(src.pixels()) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Copy of `base` with each layer composited over it in order.
pub fn flatten_layers(base: &RasterImage, layers: &[&RgbaBuffer]) -> SegcanvasResult<RgbaBuffer> {
    let mut out = base.pixels().clone();
    for layer in layers {
        over_in_place(&mut out, layer, 255)?;
    }
    Ok(out)
}
