use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};

use tma_charts::data::filter::ExclusionSpec;
use tma_charts::data::loader::{find_first_csv, load_csv, DEFAULT_DATA_DIR};
use tma_charts::data::model::Table;
use tma_charts::grid::MatchMode;
use tma_charts::options::{discover, ChartKind};
use tma_charts::render::boxplot::{BoxPlotConfig, DataType};
use tma_charts::render::heatmap::HeatmapConfig;
use tma_charts::render::histogram::HistogramConfig;
use tma_charts::render::{boxplot, encode_base64, heatmap, histogram, OutputFormat};
use tma_charts::style::TextStyle;

/// Render a TMA chart from a CSV and print it as one base64 line.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Slide-layout heatmap of one measurement per core
    Heatmap(HeatmapArgs),
    /// Box plot of a percentage column grouped by a category
    #[command(alias = "box_and_scatter", alias = "box_whisker")]
    Boxplot(BoxplotArgs),
    /// Histogram of one measurement in 10-unit bins
    Histogram(HistogramArgs),
    /// Print the choices available for a chart type as JSON
    Options(OptionsArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Input CSV (default: first CSV in ./data)
    #[arg(long, alias = "file_path")]
    file_path: Option<PathBuf>,
    /// png, svg or pdf
    #[arg(long, alias = "output_format", default_value = "png")]
    output_format: OutputFormat,
    #[arg(long)]
    title: Option<String>,
    /// Font family name, e.g. "Arial" or "serif"
    #[arg(long, alias = "font_style")]
    font_style: Option<String>,
    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,
    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Args)]
struct HeatmapArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Regex selecting the value column
    #[arg(long, alias = "value_pattern")]
    value_pattern: Option<String>,
    #[arg(long, alias = "color_map", default_value = "YlOrRd")]
    color_map: String,
    /// Comma-separated sample ids or single characters to leave out
    #[arg(long, alias = "exclude_ids")]
    exclude_ids: Option<String>,
    /// Comma-separated row letters, in display order
    #[arg(long, alias = "row_order", value_delimiter = ',')]
    row_order: Vec<String>,
    /// Comma-separated column numbers, in display order
    #[arg(long, alias = "col_order", value_delimiter = ',')]
    col_order: Vec<String>,
    /// Annotate cells with their values
    #[arg(long, alias = "show_stats", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value = "true")]
    show_stats: bool,
    #[arg(long, alias = "legend_shrink", default_value_t = 1.0)]
    legend_shrink: f64,
    /// containment or exact
    #[arg(long, alias = "match_mode", default_value = "containment")]
    match_mode: MatchMode,
}

#[derive(Args)]
struct BoxplotArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Area or Cell
    #[arg(long, alias = "data_type", alias = "dataType", default_value = "Area")]
    data_type: DataType,
    /// Explicit value column, overrides --data-type
    #[arg(long, alias = "y_col")]
    y_col: Option<String>,
    #[arg(long, alias = "group_by", default_value = "Sample")]
    group_by: String,
    /// Column the exclusion list is matched against
    #[arg(long, alias = "sample_col")]
    sample_col: Option<String>,
    #[arg(long, alias = "color_palette", default_value = "Set1")]
    color_palette: String,
    /// Comma-separated groups to keep, in display order
    #[arg(long, alias = "sample_order", value_delimiter = ',')]
    sample_order: Vec<String>,
    #[arg(long, alias = "exclude_ids")]
    exclude_ids: Option<String>,
    /// Overlay the individual points
    #[arg(long, alias = "show_scatter", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value = "true")]
    show_scatter: bool,
}

#[derive(Args)]
struct HistogramArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, alias = "value_pattern")]
    value_pattern: Option<String>,
    #[arg(long, alias = "sample_col", default_value = "Sample")]
    sample_col: String,
    /// Bar colour: a name, #rrggbb, or a colour map (its midpoint is used)
    #[arg(long, alias = "color_map", alias = "color")]
    color_map: Option<String>,
    /// Comma-separated tokens; keep only samples containing one of them
    #[arg(long, alias = "letter_groups", value_delimiter = ',')]
    letter_groups: Vec<String>,
    #[arg(long, alias = "exclude_ids")]
    exclude_ids: Option<String>,
}

#[derive(Args)]
struct OptionsArgs {
    /// heatmap, boxplot or histogram
    kind: ChartKind,
    #[arg(long, alias = "file_path")]
    file_path: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<String> {
    match command {
        Commands::Heatmap(args) => {
            let table = load_table(args.common.file_path.as_deref())?;
            let defaults = HeatmapConfig::default();
            let config = HeatmapConfig {
                value_pattern: args.value_pattern.unwrap_or(defaults.value_pattern),
                title: args.common.title.unwrap_or(defaults.title),
                text: TextStyle::from_font_style(args.common.font_style.as_deref()),
                color_map: args.color_map,
                exclude: exclusion(args.exclude_ids.as_deref()),
                row_order: non_empty(args.row_order),
                col_order: non_empty(args.col_order),
                show_stats: args.show_stats,
                match_mode: args.match_mode,
                legend_shrink: args.legend_shrink,
                format: args.common.output_format,
                width: args.common.width.unwrap_or(defaults.width),
                height: args.common.height.unwrap_or(defaults.height),
            };
            let bytes = heatmap::render(&table, &config).context("rendering heatmap")?;
            Ok(encode_base64(&bytes))
        }
        Commands::Boxplot(args) => {
            let table = load_table(args.common.file_path.as_deref())?;
            let defaults = BoxPlotConfig::default();
            let config = BoxPlotConfig {
                data_type: args.data_type,
                y_col: args.y_col,
                group_by: args.group_by,
                sample_col: args.sample_col,
                exclude: exclusion(args.exclude_ids.as_deref()),
                sample_order: non_empty(args.sample_order),
                palette: args.color_palette,
                show_scatter: args.show_scatter,
                title: args.common.title,
                text: TextStyle::from_font_style(args.common.font_style.as_deref()),
                format: args.common.output_format,
                width: args.common.width.unwrap_or(defaults.width),
                height: args.common.height.unwrap_or(defaults.height),
            };
            let bytes = boxplot::render(&table, &config).context("rendering box plot")?;
            Ok(encode_base64(&bytes))
        }
        Commands::Histogram(args) => {
            let table = load_table(args.common.file_path.as_deref())?;
            let defaults = HistogramConfig::default();
            let config = HistogramConfig {
                value_pattern: args.value_pattern.unwrap_or(defaults.value_pattern),
                sample_col: args.sample_col,
                exclude: exclusion(args.exclude_ids.as_deref()),
                letter_groups: non_empty(args.letter_groups).unwrap_or_default(),
                color: args.color_map,
                title: args.common.title,
                text: TextStyle::from_font_style(args.common.font_style.as_deref()),
                format: args.common.output_format,
                width: args.common.width.unwrap_or(defaults.width),
                height: args.common.height.unwrap_or(defaults.height),
            };
            let bytes = histogram::render(&table, &config).context("rendering histogram")?;
            Ok(encode_base64(&bytes))
        }
        Commands::Options(args) => {
            let table = load_table(args.file_path.as_deref())?;
            let options = discover(&table, args.kind).context("discovering chart options")?;
            Ok(options.to_json()?)
        }
    }
}

fn load_table(path: Option<&Path>) -> Result<Table> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => find_first_csv(Path::new(DEFAULT_DATA_DIR)).context("locating input CSV")?,
    };
    log::info!("Using CSV file: {}", path.display());
    let table = load_csv(&path).with_context(|| format!("loading {}", path.display()))?;
    log::debug!("Loaded {} rows, columns {:?}", table.len(), table.headers());
    Ok(table)
}

fn exclusion(list: Option<&str>) -> ExclusionSpec {
    list.map(ExclusionSpec::parse).unwrap_or_default()
}

/// Trimmed, non-empty entries, or `None` when nothing is left.
fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!items.is_empty()).then_some(items)
}
