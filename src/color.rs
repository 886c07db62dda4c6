use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Regulation;

/// Ring colours for targets by sharing category ("1" is not drawn as a ring).
const CATEGORY_COLORS: [(&str, &str); 4] = [
    ("1", "#BDBDBD"),
    ("2", "#78C679"),
    ("3", "#FDDC6C"),
    ("4+", "#F16913"),
];
const DEFAULT_COLOR: &str = "#888888";

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Hue band (start, end) in degrees for each regulation direction:
/// warm for up-regulated, cool for down-regulated.
fn hue_band(regulation: Regulation) -> (f32, f32) {
    match regulation {
        Regulation::Up => (0.0, 45.0),
        Regulation::Down => (200.0, 260.0),
        Regulation::Unknown => (0.0, 360.0),
    }
}

fn to_hex(hsl: Hsl) -> String {
    let rgb: Srgb = hsl.into_color();
    let rgb: Srgb<u8> = rgb.into_format();
    format!("#{:02X}{:02X}{:02X}", rgb.red, rgb.green, rgb.blue)
}

/// Generates `n` distinct `#RRGGBB` colours within the band for `regulation`.
pub fn generate_palette(n: usize, regulation: Regulation) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let (start, end) = hue_band(regulation);
    let span = end - start;
    (0..n)
        .map(|i| {
            let hue = start + (i as f32 / n as f32) * span;
            // Alternate lightness so neighbouring hues in a narrow band differ.
            let lightness = if i % 2 == 0 { 0.50 } else { 0.62 };
            to_hex(Hsl::new(hue, 0.75, lightness))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: node → hex colour
// ---------------------------------------------------------------------------

/// Colours for the miRNAs of one network, assigned in id order per direction.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, String>,
}

impl ColorMap {
    /// Build a colour map from `(miRNA id, regulation)` pairs.
    pub fn new<'a, I>(mirnas: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Regulation)>,
    {
        let mut by_direction: BTreeMap<Regulation, Vec<&str>> = BTreeMap::new();
        for (id, reg) in mirnas {
            by_direction.entry(reg).or_default().push(id);
        }

        let mut mapping = BTreeMap::new();
        for (reg, mut ids) in by_direction {
            ids.sort_unstable();
            ids.dedup();
            let palette = generate_palette(ids.len(), reg);
            for (id, color) in ids.into_iter().zip(palette) {
                mapping.insert(id.to_string(), color);
            }
        }
        ColorMap { mapping }
    }

    /// Look up the colour for a miRNA.
    pub fn color_for(&self, id: &str) -> &str {
        self.mapping
            .get(id)
            .map(String::as_str)
            .unwrap_or(DEFAULT_COLOR)
    }

    /// Colour for a target gene by sharing category.
    pub fn category_color(category: &str) -> &'static str {
        CATEGORY_COLORS
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, hex)| *hex)
            .unwrap_or(DEFAULT_COLOR)
    }
}
