//! Histogram of one measurement with fixed 10-unit bins.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{render_to_bytes, Chart, OutputFormat};
use crate::color::resolve_fill;
use crate::data::columns::{first_column, resolve_column};
use crate::data::filter::{blank_excluded, drop_blank_samples, retain_letter_groups, ExclusionSpec};
use crate::data::model::Table;
use crate::error::{ChartError, Result};
use crate::style::TextStyle;

pub const DEFAULT_VALUE_PATTERN: &str = "Positive|H[-_]?Score|Positive_Cell_Percentage";
pub const BIN_WIDTH: f64 = 10.0;

const TITLE_ALL: &str = "Histogram of PTK7 Membrane Positive Cell Percentage - All Data";
const TITLE_GROUPS: &str = "Histogram of PTK7 Membrane Positive Cell Percentage - Columns";

#[derive(Debug, Clone)]
pub struct HistogramConfig {
    pub value_pattern: String,
    /// Sample id column; the first column is used when it is absent.
    pub sample_col: String,
    pub exclude: ExclusionSpec,
    /// Keep only samples whose id contains one of these tokens.
    pub letter_groups: Vec<String>,
    /// A colour name, `#rrggbb`, or a colour map whose midpoint is used.
    pub color: Option<String>,
    pub title: Option<String>,
    pub text: TextStyle,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            value_pattern: DEFAULT_VALUE_PATTERN.to_string(),
            sample_col: "Sample".to_string(),
            exclude: ExclusionSpec::default(),
            letter_groups: Vec::new(),
            color: None,
            title: None,
            text: TextStyle::default(),
            format: OutputFormat::Png,
            width: 800,
            height: 600,
        }
    }
}

impl HistogramConfig {
    pub fn resolved_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None if self.letter_groups.is_empty() => TITLE_ALL.to_string(),
            None => TITLE_GROUPS.to_string(),
        }
    }
}

/// Upper bound on the number of bins a histogram may span.
pub const MAX_BINS: usize = 10_000;

/// Bin edges from `floor(min / 10) * 10` to `ceil(max / 10) * 10` in steps of
/// ten. Always at least two edges. Non-finite data or a span wider than
/// [`MAX_BINS`] bins is an `InvalidOption` error.
pub fn bin_edges(values: &[f64]) -> Result<Vec<f64>> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if values.is_empty() {
        return Ok(vec![0.0, BIN_WIDTH]);
    }
    if !min.is_finite() || !max.is_finite() {
        return Err(ChartError::InvalidOption(
            "histogram values must be finite".to_string(),
        ));
    }
    let lo = (min / BIN_WIDTH).floor() * BIN_WIDTH;
    let hi = ((max / BIN_WIDTH).ceil() * BIN_WIDTH).max(lo + BIN_WIDTH);
    let n_bins = ((hi - lo) / BIN_WIDTH).round();
    if !n_bins.is_finite() || n_bins > MAX_BINS as f64 {
        return Err(ChartError::InvalidOption(format!(
            "values from {min} to {max} need {n_bins} bins of width {BIN_WIDTH} (at most {MAX_BINS})"
        )));
    }
    let n_bins = n_bins as usize;
    Ok((0..=n_bins).map(|i| lo + i as f64 * BIN_WIDTH).collect())
}

/// Count values per bin. Bins are `[a, b)` except the last, which is `[a, b]`.
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let n_bins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; n_bins];
    if n_bins == 0 {
        return counts;
    }
    let last = edges[n_bins];
    for &v in values {
        if v < edges[0] || v > last {
            continue;
        }
        let bin = if v == last {
            n_bins - 1
        } else {
            edges.partition_point(|&e| e <= v) - 1
        };
        counts[bin] += 1;
    }
    counts
}

#[derive(Debug, Clone)]
pub struct Histogram {
    pub value_col: String,
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub fill: RGBColor,
    pub title: String,
    pub text: TextStyle,
}

pub fn prepare(table: &Table, config: &HistogramConfig) -> Result<Histogram> {
    let value_col = resolve_column(table, &config.value_pattern)?;
    let sample_col = if table.column_index(&config.sample_col).is_some() {
        config.sample_col.clone()
    } else {
        first_column(table)?
    };
    log::debug!("Histogram: sample column '{sample_col}', value column '{value_col}'");

    let mut working = table.clone();
    blank_excluded(&mut working, &config.exclude, &sample_col)?;
    let working = drop_blank_samples(&working, &sample_col);
    let working = retain_letter_groups(&working, &sample_col, &config.letter_groups);

    let values: Vec<f64> = working
        .numeric_column(&value_col)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect();
    if values.is_empty() {
        return Err(ChartError::EmptyData(
            "no data points available for the histogram after filtering".to_string(),
        ));
    }

    let edges = bin_edges(&values)?;
    let counts = bin_counts(&values, &edges);
    log::info!("Histogram of {} values in {} bins", values.len(), counts.len());

    Ok(Histogram {
        value_col,
        edges,
        counts,
        fill: resolve_fill(config.color.as_deref()),
        title: config.resolved_title(),
        text: config.text,
    })
}

pub fn render(table: &Table, config: &HistogramConfig) -> Result<Vec<u8>> {
    let plot = prepare(table, config)?;
    render_to_bytes(&plot, config.format, (config.width, config.height))
}

impl Chart for Histogram {
    fn title(&self) -> &str {
        &self.title
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let lo = self.edges.first().copied().unwrap_or(0.0);
        let hi = self.edges.last().copied().unwrap_or(BIN_WIDTH);
        let top = self.counts.iter().copied().max().unwrap_or(0).max(1) as f64 * 1.05;

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, self.text.title())
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(lo..hi, 0f64..top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(self.edges.len())
            .x_label_formatter(&|x: &f64| format!("{x:.0}"))
            .y_label_formatter(&|y: &f64| format!("{y:.0}"))
            .x_desc(self.value_col.as_str())
            .y_desc("Number of Samples")
            .label_style(self.text.tick())
            .axis_desc_style(self.text.label())
            .draw()?;

        let bars = self.edges.windows(2).zip(&self.counts);
        chart.draw_series(bars.clone().map(|(edge, &count)| {
            Rectangle::new([(edge[0], 0.0), (edge[1], count as f64)], self.fill.filled())
        }))?;
        chart.draw_series(bars.map(|(edge, &count)| {
            Rectangle::new([(edge[0], 0.0), (edge[1], count as f64)], BLACK.stroke_width(1))
        }))?;
        Ok(())
    }
}
