/// Fixed display colours indexed by class id. Class 0 is white; 1..=6 are distinct hues.
pub const CLASS_PALETTE: [[u8; 4]; 7] = [
    [255, 255, 255, 255],
    [31, 119, 180, 255],
    [255, 127, 14, 255],
    [44, 160, 44, 255],
    [214, 39, 40, 255],
    [148, 103, 189, 255],
    [140, 86, 75, 255],
];

/// Colour for `class_id`; ids past the palette wrap around the labelled hues.
pub fn class_colour(class_id: u8) -> [u8; 4] {
    match class_id {
        0 => CLASS_PALETTE[0],
        id => CLASS_PALETTE[1 + (usize::from(id) - 1) % (CLASS_PALETTE.len() - 1)],
    }
}

/// Same colour with its alpha replaced.
pub fn with_alpha(rgba: [u8; 4], alpha: u8) -> [u8; 4] {
    [rgba[0], rgba[1], rgba[2], alpha]
}

/// `#rrggbb` form used by front ends for swatches.
pub fn rgba_to_hex(rgba: [u8; 4]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgba[0], rgba[1], rgba[2])
}
