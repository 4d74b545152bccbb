//! Chart renderers and image encoding.
//!
//! Each renderer draws onto a plotters `DrawingArea` that lives entirely in
//! memory: a bitmap buffer for PNG (and PDF), a string for SVG.

pub mod boxplot;
pub mod heatmap;
pub mod histogram;

use std::io::Cursor;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{ChartError, Result};

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ChartError::render(err)
    }
}

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    Pdf,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(format!("unsupported output format '{other}' (expected png|svg|pdf)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Something that can draw itself onto any plotters backend.
pub trait Chart {
    /// Document title, used as PDF metadata.
    fn title(&self) -> &str;

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>;
}

/// Render `chart` at `size` pixels and return the encoded image bytes.
pub fn render_to_bytes<C: Chart>(chart: &C, format: OutputFormat, size: (u32, u32)) -> Result<Vec<u8>> {
    let (width, height) = size;
    if width == 0 || height == 0 {
        return Err(ChartError::InvalidOption(format!(
            "image size must be positive, got {width}x{height}"
        )));
    }

    match format {
        OutputFormat::Png => encode_png(rasterize(chart, size)?, width, height),
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
                root.fill(&WHITE)?;
                chart.draw(&root)?;
                root.present()?;
            }
            Ok(svg.into_bytes())
        }
        OutputFormat::Pdf => encode_pdf(rasterize(chart, size)?, width, height, chart.title()),
    }
}

/// Draw into a packed RGB8 buffer.
fn rasterize<C: Chart>(chart: &C, size: (u32, u32)) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; size.0 as usize * size.1 as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE)?;
        chart.draw(&root)?;
        root.present()?;
    }
    Ok(buffer)
}

fn encode_png(rgb: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let img = image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| ChartError::Encode("pixel buffer does not match image size".to_string()))?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| ChartError::Encode(e.to_string()))?;
    Ok(png)
}

#[cfg(feature = "pdf")]
fn encode_pdf(rgb: Vec<u8>, width: u32, height: u32, title: &str) -> Result<Vec<u8>> {
    use printpdf::{
        ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
    };

    const DPI: f32 = 96.0;
    let to_mm = |px: u32| Mm(px as f32 * 25.4 / DPI);

    let (doc, page, layer) = PdfDocument::new(title, to_mm(width), to_mm(height), "chart");
    let image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: rgb,
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    });
    image.add_to_layer(
        doc.get_page(page).get_layer(layer),
        ImageTransform {
            dpi: Some(DPI),
            ..Default::default()
        },
    );
    doc.save_to_bytes()
        .map_err(|e| ChartError::Encode(e.to_string()))
}

#[cfg(not(feature = "pdf"))]
fn encode_pdf(_rgb: Vec<u8>, _width: u32, _height: u32, _title: &str) -> Result<Vec<u8>> {
    Err(ChartError::UnsupportedFormat(
        "PDF output not enabled (compile with the 'pdf' feature)".to_string(),
    ))
}

// ---------------------------------------------------------------------------
// Base64
// ---------------------------------------------------------------------------

/// Standard-alphabet base64, padded, no line breaks.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| ChartError::Encode(format!("invalid base64: {e}")))
}

// ---------------------------------------------------------------------------
// Shared axis helpers
// ---------------------------------------------------------------------------

/// Label for a categorical tick placed at integer positions `0..labels.len()`.
pub(crate) fn category_label(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

/// Pad a value range so points do not sit on the frame.
pub(crate) fn padded_range(lo: f64, hi: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        let pad = if lo.abs() > 1.0 { lo.abs() * 0.1 } else { 1.0 };
        return (lo - pad, hi + pad);
    }
    (lo - span * 0.05, hi + span * 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl Chart for Blank {
        fn title(&self) -> &str {
            "blank"
        }

        fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
            root.draw(&Rectangle::new([(2, 2), (10, 10)], BLACK.filled()))?;
            Ok(())
        }
    }

    #[test]
    fn png_bytes_carry_the_png_signature() {
        let png = render_to_bytes(&Blank, OutputFormat::Png, (32, 24)).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn svg_output_is_an_svg_document() {
        let svg = render_to_bytes(&Blank, OutputFormat::Svg, (32, 24)).unwrap();
        let text = String::from_utf8(svg).unwrap();
        assert!(text.contains("<svg"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_output_is_a_pdf_document() {
        let pdf = render_to_bytes(&Blank, OutputFormat::Pdf, (32, 24)).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn pdf_without_feature_is_unsupported() {
        let err = render_to_bytes(&Blank, OutputFormat::Pdf, (32, 24)).unwrap_err();
        assert!(matches!(err, ChartError::UnsupportedFormat(_)));
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            render_to_bytes(&Blank, OutputFormat::Png, (0, 10)).unwrap_err(),
            ChartError::InvalidOption(_)
        ));
    }

    #[test]
    fn base64_round_trip_is_byte_identical() {
        let png = render_to_bytes(&Blank, OutputFormat::Png, (16, 16)).unwrap();
        let encoded = encode_base64(&png);
        assert!(!encoded.contains('\n'));
        assert_eq!(decode_base64(&encoded).unwrap(), png);
    }

    #[test]
    fn formats_parse() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("pdf".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert!("jpeg".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn category_labels_only_at_integers() {
        let labels = vec!["A".to_string(), "B".to_string()];
        assert_eq!(category_label(&labels, 1.0), "B");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn padded_range_widens_flat_data() {
        assert_eq!(padded_range(5.0, 5.0), (4.5, 5.5));
        assert_eq!(padded_range(0.5, 0.5), (-0.5, 1.5));
        let (lo, hi) = padded_range(0.0, 100.0);
        assert!(lo < 0.0 && hi > 100.0);
    }
}
