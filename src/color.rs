use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_rgb(rgb)
        })
        .collect()
}

fn to_rgb(c: Srgb) -> RGBColor {
    RGBColor(
        (c.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (c.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (c.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Qualitative palettes: group label → colour
// ---------------------------------------------------------------------------

const SET1: [(u8, u8, u8); 9] = [
    (228, 26, 28),
    (55, 126, 184),
    (77, 175, 74),
    (152, 78, 163),
    (255, 127, 0),
    (255, 255, 51),
    (166, 86, 40),
    (247, 129, 191),
    (153, 153, 153),
];

const SET2: [(u8, u8, u8); 8] = [
    (102, 194, 165),
    (252, 141, 98),
    (141, 160, 203),
    (231, 138, 195),
    (166, 216, 84),
    (255, 217, 47),
    (229, 196, 148),
    (179, 179, 179),
];

const DARK2: [(u8, u8, u8); 8] = [
    (27, 158, 119),
    (217, 95, 2),
    (117, 112, 179),
    (231, 41, 138),
    (102, 166, 30),
    (230, 171, 2),
    (166, 118, 29),
    (102, 102, 102),
];

const PASTEL1: [(u8, u8, u8); 9] = [
    (251, 180, 174),
    (179, 205, 227),
    (204, 235, 197),
    (222, 203, 228),
    (254, 217, 166),
    (255, 255, 204),
    (229, 216, 189),
    (253, 218, 236),
    (242, 242, 242),
];

const TAB10: [(u8, u8, u8); 10] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
];

/// `n` colours from a named qualitative palette, cycling when `n` exceeds
/// its size. `husl`/`hls` and unknown names use evenly spaced hues.
pub fn named_palette(name: &str, n: usize) -> Vec<RGBColor> {
    let table: &[(u8, u8, u8)] = match name.to_ascii_lowercase().as_str() {
        "set1" => &SET1,
        "set2" => &SET2,
        "dark2" => &DARK2,
        "pastel1" => &PASTEL1,
        "tab10" => &TAB10,
        "husl" | "hls" => return generate_palette(n),
        _ => {
            // A single colour name paints every group the same.
            if let Some(c) = parse_color(name) {
                return vec![c; n];
            }
            log::warn!("Unknown palette '{name}', using evenly spaced hues");
            return generate_palette(n);
        }
    };
    (0..n)
        .map(|i| {
            let (r, g, b) = table[i % table.len()];
            RGBColor(r, g, b)
        })
        .collect()
}

/// Maps group labels to distinct colours, in the order the groups are drawn.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, RGBColor>,
    default_color: RGBColor,
}

impl ColorMap {
    pub fn new(groups: &[String], palette_name: &str) -> Self {
        let palette = named_palette(palette_name, groups.len());
        let mapping = groups.iter().cloned().zip(palette).collect();
        ColorMap {
            mapping,
            default_color: RGBColor(128, 128, 128),
        }
    }

    pub fn color_for(&self, group: &str) -> RGBColor {
        self.mapping
            .get(group)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Sequential colour maps: value in [0, 1] → colour
// ---------------------------------------------------------------------------

const YLORRD: [(u8, u8, u8); 9] = [
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
];
const BLUES: [(u8, u8, u8); 5] = [
    (247, 251, 255),
    (198, 219, 239),
    (107, 174, 214),
    (33, 113, 181),
    (8, 48, 107),
];
const GREENS: [(u8, u8, u8); 5] = [
    (247, 252, 245),
    (199, 233, 192),
    (116, 196, 118),
    (35, 139, 69),
    (0, 68, 27),
];
const REDS: [(u8, u8, u8); 5] = [
    (255, 245, 240),
    (252, 187, 161),
    (251, 106, 74),
    (203, 24, 29),
    (103, 0, 13),
];
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];
const MAGMA: [(u8, u8, u8); 5] = [
    (0, 0, 4),
    (81, 18, 124),
    (183, 55, 121),
    (252, 137, 97),
    (252, 253, 191),
];
const COOLWARM: [(u8, u8, u8); 5] = [
    (59, 76, 192),
    (141, 176, 254),
    (221, 221, 221),
    (244, 154, 123),
    (180, 4, 38),
];

fn linear(r: u8, g: u8, b: u8) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

/// A continuous colour map built from evenly spaced anchor colours.
#[derive(Debug, Clone)]
pub struct ColorScale {
    name: String,
    anchors: Vec<LinSrgb>,
}

impl ColorScale {
    /// Look up a colour map by name; `_r` reverses it.
    pub fn named(name: &str) -> Option<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let table: &[(u8, u8, u8)] = match base.to_ascii_lowercase().as_str() {
            "ylorrd" => &YLORRD,
            "blues" => &BLUES,
            "greens" => &GREENS,
            "reds" => &REDS,
            "viridis" => &VIRIDIS,
            "magma" => &MAGMA,
            "coolwarm" => &COOLWARM,
            _ => return None,
        };
        let mut anchors: Vec<LinSrgb> = table.iter().map(|&(r, g, b)| linear(r, g, b)).collect();
        if reversed {
            anchors.reverse();
        }
        Some(ColorScale {
            name: name.to_string(),
            anchors,
        })
    }

    /// Named map, or `YlOrRd` with a warning when the name is unknown.
    pub fn named_or_default(name: &str) -> Self {
        Self::named(name).unwrap_or_else(|| {
            log::warn!("Unknown colour map '{name}', using YlOrRd");
            Self::default()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Colour at position `t` (clamped to `[0, 1]`).
    pub fn at(&self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 0.0 };
        let segments = (self.anchors.len() - 1) as f32;
        let pos = t * segments;
        let i = (pos.floor() as usize).min(self.anchors.len() - 2);
        let frac = pos - i as f32;
        let mixed = self.anchors[i].mix(self.anchors[i + 1], frac);
        let srgb: Srgb = mixed.into_color();
        to_rgb(srgb)
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        ColorScale {
            name: "YlOrRd".to_string(),
            anchors: YLORRD.iter().map(|&(r, g, b)| linear(r, g, b)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Single colours
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` or a small set of common colour names.
pub fn parse_color(s: &str) -> Option<RGBColor> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            return Some(RGBColor(channel(0)?, channel(2)?, channel(4)?));
        }
        return None;
    }
    let rgb = match s.to_ascii_lowercase().as_str() {
        "skyblue" => (135, 206, 235),
        "steelblue" => (70, 130, 180),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "gray" | "grey" => (128, 128, 128),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "salmon" => (250, 128, 114),
        "teal" => (0, 128, 128),
        "navy" => (0, 0, 128),
        _ => return None,
    };
    Some(RGBColor(rgb.0, rgb.1, rgb.2))
}

/// Resolve a histogram bar colour: a colour name/hex, or the midpoint of a
/// named colour map. Falls back to sky blue.
pub fn resolve_fill(choice: Option<&str>) -> RGBColor {
    let skyblue = RGBColor(135, 206, 235);
    let Some(choice) = choice.map(str::trim).filter(|s| !s.is_empty()) else {
        return skyblue;
    };
    if let Some(c) = parse_color(choice) {
        return c;
    }
    if let Some(scale) = ColorScale::named(choice) {
        return scale.at(0.5);
    }
    log::warn!("Unknown colour '{choice}', using skyblue");
    skyblue
}

/// Black or white, whichever reads better on `bg`.
pub fn contrasting_text(bg: RGBColor) -> RGBColor {
    let luminance = 0.299 * bg.0 as f64 + 0.587 * bg.1 as f64 + 0.114 * bg.2 as f64;
    if luminance > 140.0 {
        RGBColor(20, 20, 20)
    } else {
        RGBColor(245, 245, 245)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn set1_cycles() {
        let p = named_palette("Set1", 11);
        assert_eq!(p[0], RGBColor(228, 26, 28));
        assert_eq!(p[9], p[0]);
    }

    #[test]
    fn color_map_assigns_in_group_order() {
        let groups = vec!["Tumor".to_string(), "Normal".to_string()];
        let cm = ColorMap::new(&groups, "Set1");
        assert_eq!(cm.color_for("Tumor"), RGBColor(228, 26, 28));
        assert_eq!(cm.color_for("Normal"), RGBColor(55, 126, 184));
        assert_eq!(cm.color_for("Other"), RGBColor(128, 128, 128));
    }

    #[test]
    fn scale_endpoints_match_anchors() {
        let scale = ColorScale::named("YlOrRd").unwrap();
        assert_eq!(scale.at(0.0), RGBColor(255, 255, 204));
        assert_eq!(scale.at(1.0), RGBColor(128, 0, 38));
        assert_eq!(scale.at(7.0), RGBColor(128, 0, 38));
        let reversed = ColorScale::named("YlOrRd_r").unwrap();
        assert_eq!(reversed.at(0.0), RGBColor(128, 0, 38));
    }

    #[test]
    fn unknown_scale_falls_back() {
        assert!(ColorScale::named("nope").is_none());
        assert_eq!(ColorScale::named_or_default("nope").name(), "YlOrRd");
    }

    #[test]
    fn colors_parse() {
        assert_eq!(parse_color("#ff8000"), Some(RGBColor(255, 128, 0)));
        assert_eq!(parse_color("SkyBlue"), Some(RGBColor(135, 206, 235)));
        assert_eq!(parse_color("#ff80"), None);
        assert_eq!(resolve_fill(None), RGBColor(135, 206, 235));
        assert_eq!(resolve_fill(Some("viridis")), ColorScale::named("viridis").unwrap().at(0.5));
    }

    #[test]
    fn text_contrasts_with_background() {
        assert_eq!(contrasting_text(RGBColor(255, 255, 204)), RGBColor(20, 20, 20));
        assert_eq!(contrasting_text(RGBColor(128, 0, 38)), RGBColor(245, 245, 245));
    }
}
