pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// `round(value / delta)` with halves rounded away from zero, saturating at `u8::MAX`.
pub(crate) fn round_div_u8(value: u8, delta: u8) -> u8 {
    debug_assert!(delta > 0);
    let v = u16::from(value);
    let d = u16::from(delta);
    ((2 * v + d) / (2 * d)).min(255) as u8
}

/// Opacity in `[0, 1]` to an 8-bit alpha.
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
