//! Text styling handed to each renderer explicitly.

use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, FontFamily, IntoFont, RGBColor, TextStyle as PlotTextStyle};

/// Font family used when a requested name is not recognised.
pub const DEFAULT_FAMILY: &str = "DejaVu Sans";

/// Map a user-facing font name onto an installed family.
pub fn font_family_for(name: &str) -> &'static str {
    match name.trim() {
        "Arial" => "Arial",
        "Times New Roman" => "Times New Roman",
        "Liberation Sans" => "Liberation Sans",
        "DejaVu Sans" | "sans-serif" => "DejaVu Sans",
        "serif" | "DejaVu Serif" => "DejaVu Serif",
        other => {
            log::warn!("Unknown font style '{other}', using {DEFAULT_FAMILY}");
            DEFAULT_FAMILY
        }
    }
}

/// Per-chart text settings; one value per render call, never shared state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub family: &'static str,
    pub title_size: u32,
    pub label_size: u32,
    pub tick_size: u32,
    pub annotation_size: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: DEFAULT_FAMILY,
            title_size: 26,
            label_size: 20,
            tick_size: 15,
            annotation_size: 11,
        }
    }
}

impl TextStyle {
    pub fn from_font_style(font_style: Option<&str>) -> Self {
        Self {
            family: font_style.map(font_family_for).unwrap_or(DEFAULT_FAMILY),
            ..Self::default()
        }
    }

    fn font(&self, size: u32) -> PlotTextStyle<'static> {
        (FontFamily::Name(self.family), size).into_font().into()
    }

    pub fn title(&self) -> PlotTextStyle<'static> {
        self.font(self.title_size)
    }

    pub fn label(&self) -> PlotTextStyle<'static> {
        self.font(self.label_size)
    }

    pub fn tick(&self) -> PlotTextStyle<'static> {
        self.font(self.tick_size)
    }

    /// Centred cell annotation in the given colour.
    pub fn annotation(&self, color: RGBColor) -> PlotTextStyle<'static> {
        let mut style = self
            .font(self.annotation_size)
            .pos(Pos::new(HPos::Center, VPos::Center));
        style.color = color.to_backend_color();
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_names_map_to_dejavu() {
        assert_eq!(font_family_for("sans-serif"), "DejaVu Sans");
        assert_eq!(font_family_for("serif"), "DejaVu Serif");
        assert_eq!(font_family_for("Times New Roman"), "Times New Roman");
    }

    #[test]
    fn unknown_font_falls_back() {
        assert_eq!(font_family_for("Comic Sans"), DEFAULT_FAMILY);
        assert_eq!(TextStyle::from_font_style(None).family, DEFAULT_FAMILY);
    }

    #[test]
    fn styles_are_independent_values() {
        let serif = TextStyle::from_font_style(Some("serif"));
        let sans = TextStyle::from_font_style(Some("Arial"));
        assert_eq!(serif.family, "DejaVu Serif");
        assert_eq!(sans.family, "Arial");
        assert_eq!(TextStyle::default().family, DEFAULT_FAMILY);
    }
}
