//! End-to-end: CSV on disk → table → chart bytes → base64 line.

use std::io::Write;

use tempfile::NamedTempFile;
use tma_charts::data::filter::ExclusionSpec;
use tma_charts::data::loader::load_csv;
use tma_charts::options::{discover, ChartKind};
use tma_charts::render::boxplot::BoxPlotConfig;
use tma_charts::render::heatmap::HeatmapConfig;
use tma_charts::render::histogram::HistogramConfig;
use tma_charts::render::{boxplot, decode_base64, encode_base64, heatmap, histogram, OutputFormat};
use tma_charts::ChartError;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A 3 × 4 slide with one lost core (B3) and a control row (C).
fn slide_csv() -> NamedTempFile {
    let mut csv = String::from("Core,Positive Cell Percentage\n");
    for (r, row) in ["A", "B", "C"].iter().enumerate() {
        for col in 1..=4 {
            let value = if *row == "B" && col == 3 {
                String::new()
            } else {
                format!("{:.1}", r as f64 * 20.0 + col as f64 * 3.5)
            };
            csv.push_str(&format!("{row}{col},{value}\n"));
        }
    }
    write_csv(&csv)
}

#[test]
fn heatmap_pipeline_produces_a_decodable_png() {
    let file = slide_csv();
    let table = load_csv(file.path()).unwrap();
    assert_eq!(table.headers()[1], "Positive_Cell_Percentage");

    let config = HeatmapConfig {
        exclude: ExclusionSpec::parse("C"),
        ..HeatmapConfig::default()
    };
    let plot = heatmap::prepare(&table, &config).unwrap();
    assert_eq!(plot.grid.row_keys, vec!["A", "B"]);
    assert_eq!(plot.grid.col_keys, vec!["1", "2", "3", "4"]);
    assert_eq!(plot.grid.cell_at("B", "3").unwrap().label, "B3");
    assert_eq!(plot.grid.cell_at("A", "2").unwrap().label, "A2: 7.00%");

    let png = heatmap::render(&table, &config).unwrap();
    let line = encode_base64(&png);
    assert!(!line.contains('\n'));
    let decoded = decode_base64(&line).unwrap();
    assert_eq!(decoded, png);
    assert_eq!(&decoded[..8], &PNG_SIGNATURE);
}

#[test]
fn heatmap_orders_act_as_filters() {
    let file = slide_csv();
    let table = load_csv(file.path()).unwrap();
    let config = HeatmapConfig {
        row_order: Some(vec!["C".into(), "A".into(), "Z".into()]),
        col_order: Some(vec!["4".into(), "1".into()]),
        format: OutputFormat::Svg,
        ..HeatmapConfig::default()
    };
    let plot = heatmap::prepare(&table, &config).unwrap();
    assert_eq!(plot.grid.row_keys, vec!["C", "A"]);
    assert_eq!(plot.grid.col_keys, vec!["4", "1"]);

    assert!(plot.grid.cell_at("B", "1").is_none());
    assert_eq!(plot.grid.populated_cells(), 4);

    let svg = String::from_utf8(heatmap::render(&table, &config).unwrap()).unwrap();
    assert!(svg.contains("C4: 54.00%"));
    assert!(!svg.contains("B1: "));
}

#[test]
fn boxplot_pipeline_groups_by_sample() {
    let file = write_csv(
        "Core,Sample,Positive Area Percentage\n\
         A1,Tumor,30.5\n\
         A2,Tumor,41.0\n\
         A3,Tumor,NA\n\
         B1,Normal,10.0\n\
         B2,Normal,12.5\n\
         B3,Normal,95.0\n",
    );
    let table = load_csv(file.path()).unwrap();

    let plot = boxplot::prepare(&table, &BoxPlotConfig::default()).unwrap();
    assert_eq!(plot.groups.len(), 2);
    assert_eq!(plot.groups[0].values, vec![30.5, 41.0]);
    assert_eq!(plot.y_label, "% Positive Area");

    let config = BoxPlotConfig {
        exclude: ExclusionSpec::parse("B3"),
        show_scatter: false,
        ..BoxPlotConfig::default()
    };
    let png = boxplot::render(&table, &config).unwrap();
    assert_eq!(&decode_base64(&encode_base64(&png)).unwrap()[..8], &PNG_SIGNATURE);
}

#[test]
fn histogram_pipeline_bins_by_ten() {
    let file = write_csv(
        "Sample,Positive Cell Percentage\n\
         A1,4\n\
         A2,12\n\
         B1,19.5\n\
         B2,20\n\
         C1,\n",
    );
    let table = load_csv(file.path()).unwrap();

    let hist = histogram::prepare(&table, &HistogramConfig::default()).unwrap();
    assert_eq!(hist.edges, vec![0.0, 10.0, 20.0]);
    assert_eq!(hist.counts, vec![1, 3]);

    let png = histogram::render(&table, &HistogramConfig::default()).unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);
}

#[test]
fn missing_column_and_empty_data_surface_as_errors() {
    let file = write_csv("Sample,Notes\nA1,ok\n");
    let table = load_csv(file.path()).unwrap();
    assert!(matches!(
        histogram::render(&table, &HistogramConfig::default()).unwrap_err(),
        ChartError::ColumnResolution { .. }
    ));

    let file = write_csv("Sample,H-Score\nA1,\nB1,\n");
    let table = load_csv(file.path()).unwrap();
    assert!(matches!(
        histogram::render(&table, &HistogramConfig::default()).unwrap_err(),
        ChartError::EmptyData(_)
    ));
}

#[test]
fn options_are_read_from_the_same_file() {
    let file = slide_csv();
    let table = load_csv(file.path()).unwrap();
    let json = discover(&table, ChartKind::Heatmap).unwrap().to_json().unwrap();
    assert_eq!(
        json,
        r#"{"rowLetters":["A","B","C"],"colNumbers":["1","2","3","4"]}"#
    );
}
