// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Named color table (SVG/CSS names, as accepted by OpenSCAD's `color()`)

/// RGB triplets in 0..=255; converted to OpenSCAD's 0..1 range on lookup.
const COLOR_NAMES: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("maroon", [128, 0, 0]),
    ("olive", [128, 128, 0]),
    ("purple", [128, 0, 128]),
    ("teal", [0, 128, 128]),
    ("navy", [0, 0, 128]),
    ("orange", [255, 165, 0]),
    ("gold", [255, 215, 0]),
    ("brown", [165, 42, 42]),
    ("chocolate", [210, 105, 30]),
    ("tan", [210, 180, 140]),
    ("pink", [255, 192, 203]),
    ("salmon", [250, 128, 114]),
    ("coral", [255, 127, 80]),
    ("crimson", [220, 20, 60]),
    ("indigo", [75, 0, 130]),
    ("violet", [238, 130, 238]),
    ("orchid", [218, 112, 214]),
    ("khaki", [240, 230, 140]),
    ("beige", [245, 245, 220]),
    ("ivory", [255, 255, 240]),
    ("lavender", [230, 230, 250]),
    ("turquoise", [64, 224, 208]),
    ("skyblue", [135, 206, 235]),
    ("steelblue", [70, 130, 180]),
    ("royalblue", [65, 105, 225]),
    ("darkgreen", [0, 100, 0]),
    ("forestgreen", [34, 139, 34]),
    ("seagreen", [46, 139, 87]),
    ("darkred", [139, 0, 0]),
    ("darkgray", [169, 169, 169]),
    ("lightgray", [211, 211, 211]),
    ("slategray", [112, 128, 144]),
    ("dimgray", [105, 105, 105]),
];

fn to_rgba(rgb: [u8; 3]) -> [f64; 4] {
    [
        f64::from(rgb[0]) / 255.0,
        f64::from(rgb[1]) / 255.0,
        f64::from(rgb[2]) / 255.0,
        1.0,
    ]
}

/// Look up a color by name (case-insensitive)
pub fn lookup(name: &str) -> Option<[f64; 4]> {
    let name = name.to_ascii_lowercase();
    COLOR_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, rgb)| to_rgba(*rgb))
}

/// Iterate every named color as RGBA in 0..1
pub fn named_colors() -> impl Iterator<Item = (&'static str, [f64; 4])> {
    COLOR_NAMES.iter().map(|(name, rgb)| (*name, to_rgba(*rgb)))
}
