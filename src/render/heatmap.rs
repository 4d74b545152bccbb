//! TMA heatmap: one coloured, annotated cell per sample position.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{category_label, render_to_bytes, Chart, OutputFormat};
use crate::color::{contrasting_text, ColorScale};
use crate::data::columns::{first_column, resolve_column};
use crate::data::filter::{blank_excluded, drop_blank_samples, ExclusionSpec};
use crate::data::model::{SampleRecord, Table};
use crate::data::samples::sort_records;
use crate::error::{ChartError, Result};
use crate::grid::{build_grid, Grid, GridOptions, MatchMode};
use crate::style::TextStyle;

pub const DEFAULT_VALUE_PATTERN: &str = "Positive|H[-_]?Score";
pub const DEFAULT_TITLE: &str = "Heatmap of Positive Cell Percentage";

/// Width reserved for the colour bar, in pixels.
const COLORBAR_WIDTH: u32 = 150;

#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    /// Regex that must match exactly one column: the measurement.
    pub value_pattern: String,
    pub title: String,
    pub text: TextStyle,
    pub color_map: String,
    pub exclude: ExclusionSpec,
    pub row_order: Option<Vec<String>>,
    pub col_order: Option<Vec<String>>,
    /// Annotate cells with the formatted value, not just the sample id.
    pub show_stats: bool,
    pub match_mode: MatchMode,
    /// Colour bar length as a fraction of the plot height.
    pub legend_shrink: f64,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            value_pattern: DEFAULT_VALUE_PATTERN.to_string(),
            title: DEFAULT_TITLE.to_string(),
            text: TextStyle::default(),
            color_map: "YlOrRd".to_string(),
            exclude: ExclusionSpec::default(),
            row_order: None,
            col_order: None,
            show_stats: true,
            match_mode: MatchMode::Containment,
            legend_shrink: 1.0,
            format: OutputFormat::Png,
            width: 1000,
            height: 600,
        }
    }
}

/// Everything the heatmap draws, computed before any pixels are touched.
#[derive(Debug, Clone)]
pub struct HeatmapPlot {
    pub grid: Grid,
    pub value_col: String,
    pub title: String,
    pub text: TextStyle,
    pub scale: ColorScale,
    pub legend_shrink: f64,
}

/// Resolve the measurement column, drop excluded samples, sort the rest and
/// rebuild the slide grid.
pub fn prepare(table: &Table, config: &HeatmapConfig) -> Result<HeatmapPlot> {
    let value_col = resolve_column(table, &config.value_pattern)?;
    let sample_col = first_column(table)?;
    log::debug!("Heatmap: sample column '{sample_col}', value column '{value_col}'");

    let mut working = table.clone();
    blank_excluded(&mut working, &config.exclude, &sample_col)?;
    let working = drop_blank_samples(&working, &sample_col);

    let records = sample_records(&working, &sample_col, &value_col);
    if records.is_empty() {
        return Err(ChartError::EmptyData(
            "no samples left for the heatmap after exclusion".to_string(),
        ));
    }
    let records = sort_records(records)?;
    log::debug!(
        "First samples: {:?}",
        records.iter().take(5).map(|r| r.sample_id.as_str()).collect::<Vec<_>>()
    );

    let grid = build_grid(
        &records,
        &GridOptions {
            row_order: config.row_order.clone(),
            col_order: config.col_order.clone(),
            show_labels: config.show_stats,
            match_mode: config.match_mode,
        },
    );
    if grid.n_rows() == 0 || grid.n_cols() == 0 {
        return Err(ChartError::EmptyData(
            "no sample ids map onto a row letter and column number".to_string(),
        ));
    }
    log::info!(
        "Heatmap grid {}x{} with {} populated cells",
        grid.n_rows(),
        grid.n_cols(),
        grid.populated_cells()
    );

    Ok(HeatmapPlot {
        grid,
        value_col,
        title: config.title.clone(),
        text: config.text,
        scale: ColorScale::named_or_default(&config.color_map),
        legend_shrink: config.legend_shrink,
    })
}

/// Load-to-bytes pipeline for one heatmap.
pub fn render(table: &Table, config: &HeatmapConfig) -> Result<Vec<u8>> {
    let plot = prepare(table, config)?;
    render_to_bytes(&plot, config.format, (config.width, config.height))
}

fn sample_records(table: &Table, sample_col: &str, value_col: &str) -> Vec<SampleRecord> {
    let ids = table.text_column(sample_col).unwrap_or_default();
    let values = table.numeric_column(value_col).unwrap_or_default();
    ids.into_iter()
        .zip(values)
        .filter_map(|(id, value)| id.map(|id| SampleRecord::new(id, value)))
        .collect()
}

impl HeatmapPlot {
    fn normalize(&self, value: f64, lo: f64, hi: f64) -> f64 {
        if (hi - lo).abs() < f64::EPSILON {
            0.5
        } else {
            (value - lo) / (hi - lo)
        }
    }

    fn draw_cells<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, lo: f64, hi: f64) -> Result<()> {
        let grid = &self.grid;
        let n_rows = grid.n_rows();
        let n_cols = grid.n_cols();
        // Row 0 is drawn at the top.
        let y_of = |row: usize| (n_rows - 1 - row) as f64;

        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n_cols as f64 - 0.5), -0.5f64..(n_rows as f64 - 0.5))?;

        let col_keys = &grid.col_keys;
        let row_keys_top_down: Vec<String> = grid.row_keys.iter().rev().cloned().collect();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(n_cols)
            .y_labels(n_rows)
            .x_label_formatter(&|x: &f64| category_label(col_keys, *x))
            .y_label_formatter(&|y: &f64| category_label(&row_keys_top_down, *y))
            .label_style(self.text.tick())
            .draw()?;

        let mut rects = Vec::new();
        let mut labels = Vec::new();
        for row in 0..n_rows {
            for col in 0..n_cols {
                let Some(cell) = grid.cell(row, col) else {
                    continue;
                };
                let (x, y) = (col as f64, y_of(row));
                let text_color = match cell.value {
                    Some(v) => {
                        let fill = self.scale.at(self.normalize(v, lo, hi));
                        rects.push(Rectangle::new(
                            [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                            fill.filled(),
                        ));
                        contrasting_text(fill)
                    }
                    None => BLACK,
                };
                if !cell.label.is_empty() {
                    labels.push(Text::new(
                        cell.label.clone(),
                        (x, y),
                        self.text.annotation(text_color),
                    ));
                }
            }
        }
        chart.draw_series(rects)?;
        chart.draw_series(labels)?;
        Ok(())
    }

    fn draw_colorbar<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, lo: f64, hi: f64) -> Result<()> {
        let (_, height) = area.dim_in_pixel();
        let shrink = self.legend_shrink.clamp(0.05, 1.0);
        let inset = ((1.0 - shrink) * height as f64 / 2.0).round() as i32;
        let area = area.margin(inset, inset, 0, 0);

        let (lo, hi) = if (hi - lo).abs() < f64::EPSILON {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        };
        let mut bar = ChartBuilder::on(&area)
            .margin(10)
            .margin_top(30)
            .margin_bottom(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..1f64, lo..hi)?;
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(6)
            .y_desc(self.value_col.as_str())
            .label_style(self.text.tick())
            .axis_desc_style(self.text.label())
            .draw()?;

        let steps = 100;
        let step = (hi - lo) / steps as f64;
        bar.draw_series((0..steps).map(|i| {
            let y0 = lo + step * i as f64;
            let fill = self.scale.at((i as f64 + 0.5) / steps as f64);
            Rectangle::new([(0.0, y0), (1.0, y0 + step)], fill.filled())
        }))?;
        Ok(())
    }
}

impl Chart for HeatmapPlot {
    fn title(&self) -> &str {
        &self.title
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let body = root.titled(&self.title, self.text.title())?;
        let (width, _) = body.dim_in_pixel();
        let (cells, colorbar) = body.split_horizontally(width.saturating_sub(COLORBAR_WIDTH) as i32);

        let (lo, hi) = self.grid.value_range().unwrap_or((0.0, 1.0));
        self.draw_cells(&cells, lo, hi)?;
        self.draw_colorbar(&colorbar, lo, hi)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn tma_table() -> Table {
        let rows = [
            ("B2", Some(40.0)),
            ("A1", Some(10.0)),
            ("A2", Some(20.0)),
            ("B1", Some(30.0)),
            ("C1", None),
        ];
        Table::from_rows(
            vec!["Core".into(), "Positive_Cell_Percentage".into()],
            rows.iter()
                .map(|(id, v)| {
                    vec![
                        CellValue::Text(id.to_string()),
                        v.map(CellValue::Float).unwrap_or(CellValue::Null),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn prepare_builds_the_slide_grid() {
        let plot = prepare(&tma_table(), &HeatmapConfig::default()).unwrap();
        assert_eq!(plot.value_col, "Positive_Cell_Percentage");
        assert_eq!(plot.grid.row_keys, vec!["A", "B", "C"]);
        assert_eq!(plot.grid.col_keys, vec!["1", "2"]);
        assert_eq!(plot.grid.cell_at("B", "2").unwrap().label, "B2: 40.00%");
        assert_eq!(plot.grid.cell_at("C", "1").unwrap().label, "C1");
        assert!(plot.grid.cell_at("C", "2").is_none());
    }

    #[test]
    fn excluded_samples_leave_the_grid() {
        let config = HeatmapConfig {
            exclude: ExclusionSpec::parse("C,A2"),
            ..HeatmapConfig::default()
        };
        let plot = prepare(&tma_table(), &config).unwrap();
        assert_eq!(plot.grid.row_keys, vec!["A", "B"]);
        assert!(plot.grid.cell_at("A", "2").is_none());
        assert_eq!(plot.grid.cell_at("A", "1").unwrap().value, Some(10.0));
    }

    #[test]
    fn excluding_everything_is_empty_data() {
        let config = HeatmapConfig {
            exclude: ExclusionSpec::parse("1,2"),
            ..HeatmapConfig::default()
        };
        assert!(matches!(
            prepare(&tma_table(), &config).unwrap_err(),
            ChartError::EmptyData(_)
        ));
    }

    #[test]
    fn sample_without_digits_fails_sorting() {
        let table = Table::from_rows(
            vec!["Core".into(), "H_Score".into()],
            vec![
                vec![CellValue::Text("A1".into()), CellValue::Float(1.0)],
                vec![CellValue::Text("Blank".into()), CellValue::Float(2.0)],
            ],
        );
        assert!(matches!(
            prepare(&table, &HeatmapConfig::default()).unwrap_err(),
            ChartError::SampleIdFormat { .. }
        ));
    }

    #[test]
    fn ambiguous_value_column_is_rejected() {
        let table = Table::from_rows(
            vec!["Core".into(), "Positive_Area".into(), "H_Score".into()],
            Vec::new(),
        );
        assert!(matches!(
            prepare(&table, &HeatmapConfig::default()).unwrap_err(),
            ChartError::ColumnResolution { .. }
        ));
    }

    #[test]
    fn renders_png_and_svg() {
        let png = render(&tma_table(), &HeatmapConfig::default()).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let config = HeatmapConfig {
            format: OutputFormat::Svg,
            legend_shrink: 0.5,
            row_order: Some(vec!["B".into(), "A".into()]),
            ..HeatmapConfig::default()
        };
        assert_eq!(prepare(&tma_table(), &config).unwrap().grid.row_keys, vec!["B", "A"]);
        let svg = String::from_utf8(render(&tma_table(), &config).unwrap()).unwrap();
        assert!(svg.contains("B2: 40.00%"));
    }

    #[test]
    fn infinite_values_render_as_missing() {
        let table = Table::from_rows(
            vec!["Core".into(), "Positive_Cell_Percentage".into()],
            vec![
                vec![CellValue::Text("A1".into()), CellValue::Float(f64::INFINITY)],
                vec![CellValue::Text("A2".into()), CellValue::Float(25.0)],
                vec![CellValue::Text("B1".into()), CellValue::Float(f64::NEG_INFINITY)],
            ],
        );
        let plot = prepare(&table, &HeatmapConfig::default()).unwrap();
        let a1 = plot.grid.cell_at("A", "1").unwrap();
        assert_eq!(a1.value, None);
        assert_eq!(a1.label, "A1");
        assert_eq!(plot.grid.value_range(), Some((25.0, 25.0)));

        let config = HeatmapConfig {
            format: OutputFormat::Svg,
            ..HeatmapConfig::default()
        };
        let svg = String::from_utf8(render(&table, &config).unwrap()).unwrap();
        assert!(svg.contains("A2: 25.00%"));
    }
}
