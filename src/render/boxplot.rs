//! Box plot of one measurement grouped by a categorical column, with an
//! optional jittered strip of the individual points on top.

use std::str::FromStr;

use plotters::coord::Shift;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{category_label, padded_range, render_to_bytes, Chart, OutputFormat};
use crate::color::ColorMap;
use crate::data::columns::{first_column, require_column};
use crate::data::filter::{blank_excluded, drop_blank_samples, retain_in_order, ExclusionSpec};
use crate::data::model::Table;
use crate::error::{ChartError, Result};
use crate::style::TextStyle;

const BOX_HALF_WIDTH: f64 = 0.4;
const CAP_HALF_WIDTH: f64 = 0.2;
const JITTER: f64 = 0.1;
const JITTER_SEED: u64 = 42;

/// Which of the two standard percentage columns to plot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataType {
    #[default]
    Area,
    Cell,
}

impl DataType {
    pub fn column(self) -> &'static str {
        match self {
            DataType::Area => "Positive_Area_Percentage",
            DataType::Cell => "Positive_Cell_Percentage",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DataType::Area => "% Positive Area",
            DataType::Cell => "% Positive Cells",
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "area" => Ok(DataType::Area),
            "cell" => Ok(DataType::Cell),
            other => Err(format!("data type must be 'Area' or 'Cell', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoxPlotConfig {
    pub data_type: DataType,
    /// Explicit measurement column; overrides `data_type` and becomes the
    /// axis label.
    pub y_col: Option<String>,
    pub group_by: String,
    /// Column the exclusion list is matched against. Defaults to the first
    /// column.
    pub sample_col: Option<String>,
    pub exclude: ExclusionSpec,
    /// Keep only these groups, drawn in this order.
    pub sample_order: Option<Vec<String>>,
    pub palette: String,
    pub show_scatter: bool,
    pub title: Option<String>,
    pub text: TextStyle,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl Default for BoxPlotConfig {
    fn default() -> Self {
        Self {
            data_type: DataType::Area,
            y_col: None,
            group_by: "Sample".to_string(),
            sample_col: None,
            exclude: ExclusionSpec::default(),
            sample_order: None,
            palette: "Set1".to_string(),
            show_scatter: true,
            title: None,
            text: TextStyle::default(),
            format: OutputFormat::Png,
            width: 1000,
            height: 600,
        }
    }
}

impl BoxPlotConfig {
    /// Measurement column and its axis label.
    pub fn y_column(&self) -> (String, String) {
        match &self.y_col {
            Some(col) => (col.clone(), col.clone()),
            None => (
                self.data_type.column().to_string(),
                self.data_type.label().to_string(),
            ),
        }
    }

    pub fn resolved_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("Box Plot of {} by {}", self.y_column().1, self.group_by),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Linear-interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let base = pos.floor() as usize;
    let rest = pos - base as f64;
    if base + 1 < sorted.len() {
        sorted[base] + rest * (sorted[base + 1] - sorted[base])
    } else {
        sorted[base]
    }
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Most extreme data points within 1.5·IQR of the box.
    pub whisker_lo: f64,
    pub whisker_hi: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = |v: &&f64| **v >= lo_fence && **v <= hi_fence;
        let whisker_lo = sorted.iter().find(inside).copied().unwrap_or(q1);
        let whisker_hi = sorted.iter().rev().find(inside).copied().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxStats {
            q1,
            median,
            q3,
            whisker_lo,
            whisker_hi,
            outliers,
        })
    }
}

// ---------------------------------------------------------------------------
// Prepared plot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BoxGroup {
    pub name: String,
    pub values: Vec<f64>,
    /// `None` when the group has no numeric values.
    pub stats: Option<BoxStats>,
    pub color: RGBColor,
    /// Horizontal scatter offsets, one per value.
    pub jitter: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct BoxPlot {
    pub groups: Vec<BoxGroup>,
    pub group_by: String,
    pub y_label: String,
    pub title: String,
    pub text: TextStyle,
    pub show_scatter: bool,
}

pub fn prepare(table: &Table, config: &BoxPlotConfig) -> Result<BoxPlot> {
    let group_col = require_column(table, &config.group_by)?;
    let (y_col, y_label) = config.y_column();
    let y_col = require_column(table, &y_col)?;
    log::debug!("Box plot: '{y_col}' grouped by '{group_col}', columns {:?}", table.headers());

    let mut working = table.clone();
    if !config.exclude.is_empty() {
        let sample_col = match &config.sample_col {
            Some(name) => require_column(table, name)?,
            None => first_column(table)?,
        };
        blank_excluded(&mut working, &config.exclude, &sample_col)?;
        working = drop_blank_samples(&working, &sample_col);
    }
    if let Some(order) = &config.sample_order {
        working = retain_in_order(&working, &group_col, order);
    }

    let labels = working.text_column(&group_col).unwrap_or_default();
    let values = working.numeric_column(&y_col).unwrap_or_default();

    let mut names: Vec<String> = Vec::new();
    for name in config.sample_order.iter().flatten() {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (label, value) in labels.into_iter().zip(values) {
        let Some(label) = label else {
            continue;
        };
        let idx = match names.iter().position(|n| *n == label) {
            Some(idx) => idx,
            None => {
                names.push(label);
                buckets.push(Vec::new());
                names.len() - 1
            }
        };
        if let Some(v) = value {
            buckets[idx].push(v);
        }
    }

    if buckets.iter().all(Vec::is_empty) {
        return Err(ChartError::EmptyData(format!(
            "no numeric values in '{y_col}' to plot"
        )));
    }
    log::info!("Box plot with {} groups", names.len());

    let colors = ColorMap::new(&names, &config.palette);
    let mut rng = StdRng::seed_from_u64(JITTER_SEED);
    let groups = names
        .into_iter()
        .zip(buckets)
        .map(|(name, values)| {
            let jitter = values.iter().map(|_| rng.gen_range(-JITTER..=JITTER)).collect();
            BoxGroup {
                stats: BoxStats::from_values(&values),
                color: colors.color_for(&name),
                name,
                values,
                jitter,
            }
        })
        .collect();

    Ok(BoxPlot {
        groups,
        group_by: group_col,
        y_label,
        title: config.resolved_title(),
        text: config.text,
        show_scatter: config.show_scatter,
    })
}

pub fn render(table: &Table, config: &BoxPlotConfig) -> Result<Vec<u8>> {
    let plot = prepare(table, config)?;
    render_to_bytes(&plot, config.format, (config.width, config.height))
}

impl BoxPlot {
    fn y_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .groups
            .iter()
            .flat_map(|g| g.values.iter().copied())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        padded_range(lo, hi)
    }
}

impl Chart for BoxPlot {
    fn title(&self) -> &str {
        &self.title
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let n = self.groups.len();
        let names: Vec<String> = self.groups.iter().map(|g| g.name.clone()).collect();
        let (y_lo, y_hi) = self.y_range();

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, self.text.title())
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_lo..y_hi)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x: &f64| category_label(&names, *x))
            .x_desc(self.group_by.as_str())
            .y_desc(self.y_label.as_str())
            .label_style(self.text.tick())
            .axis_desc_style(self.text.label())
            .draw()?;

        for (i, group) in self.groups.iter().enumerate() {
            let Some(stats) = &group.stats else {
                continue;
            };
            let x = i as f64;
            let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);
            let outline = BLACK.stroke_width(1);

            chart.draw_series(std::iter::once(Rectangle::new(
                [(left, stats.q1), (right, stats.q3)],
                group.color.filled(),
            )))?;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(left, stats.q1), (right, stats.q3)],
                outline,
            )))?;
            chart.draw_series([
                PathElement::new(vec![(left, stats.median), (right, stats.median)], BLACK.stroke_width(2)),
                PathElement::new(vec![(x, stats.q3), (x, stats.whisker_hi)], outline),
                PathElement::new(vec![(x, stats.q1), (x, stats.whisker_lo)], outline),
                PathElement::new(
                    vec![(x - CAP_HALF_WIDTH, stats.whisker_hi), (x + CAP_HALF_WIDTH, stats.whisker_hi)],
                    outline,
                ),
                PathElement::new(
                    vec![(x - CAP_HALF_WIDTH, stats.whisker_lo), (x + CAP_HALF_WIDTH, stats.whisker_lo)],
                    outline,
                ),
            ])?;
            chart.draw_series(
                stats
                    .outliers
                    .iter()
                    .map(|&v| Circle::new((x, v), 4, BLACK.stroke_width(1))),
            )?;
        }

        if self.show_scatter {
            let dot = BLACK.mix(0.7).filled();
            chart.draw_series(self.groups.iter().enumerate().flat_map(|(i, group)| {
                group
                    .values
                    .iter()
                    .zip(&group.jitter)
                    .map(move |(&v, &dx)| Circle::new((i as f64 + dx, v), 4, dot))
            }))?;
        }
        Ok(())
    }
}
