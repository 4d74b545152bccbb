use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::model::{CellValue, Table};
use crate::error::{ChartError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Conventional location of the uploaded CSV.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Return the first `*.csv` file (by file name) inside `dir`.
pub fn find_first_csv(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        ChartError::InputNotFound(format!("cannot read directory {}: {e}", dir.display()))
    })?;

    let mut csv_files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    csv_files.sort();

    csv_files.into_iter().next().ok_or_else(|| {
        ChartError::InputNotFound(format!("no CSV files found in '{}'", dir.display()))
    })
}

/// Load a CSV file into a [`Table`] with normalized header names.
///
/// A header row is required. Cell types are guessed per cell; callers decide
/// which columns to read as numbers.
pub fn load_csv(path: &Path) -> Result<Table> {
    if !path.is_file() {
        return Err(ChartError::InputNotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    read_csv(file, path)
}

/// Parse CSV text from any reader; `origin` is only used in error messages.
pub fn read_csv<R: std::io::Read>(input: R, origin: &Path) -> Result<Table> {
    let parse_err = |reason: String| ChartError::Parse {
        path: origin.to_path_buf(),
        reason,
    };

    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_err(format!("reading header row: {e}")))?
        .iter()
        .map(normalize_header)
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(parse_err("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| parse_err(format!("row {}: {e}", row_no + 1)))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    log::debug!("Loaded {} rows, columns: {:?}", rows.len(), headers);
    Ok(Table::from_rows(headers, rows))
}

/// Collapse every run of `.` and/or space characters into a single `_`.
///
/// `"H. Score"` and `"H  Score"` both become `"H_Score"`.
pub fn normalize_header(name: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let re = SEPARATORS.get_or_init(|| Regex::new(r"[. ]+").expect("static regex"));
    re.replace_all(name, "_").into_owned()
}

/// Nulls, numbers and bools are recognised on the trimmed cell; text keeps
/// its surrounding whitespace.
fn guess_cell_type(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() || matches!(s, "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL" | "None") {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn headers_are_normalized() {
        assert_eq!(normalize_header("H. Score"), "H_Score");
        assert_eq!(normalize_header("H  Score"), "H_Score");
        assert_eq!(normalize_header("Positive Area Percentage"), "Positive_Area_Percentage");
        assert_eq!(normalize_header("a...b. .c"), "a_b_c");
        assert_eq!(normalize_header("Sample"), "Sample");
    }

    #[test]
    fn loading_twice_yields_identical_headers() {
        let file = write_csv("Sample,H. Score,Positive Cell.Percentage\nA1,1.5,20\n");
        let first = load_csv(file.path()).unwrap();
        let second = load_csv(file.path()).unwrap();
        assert_eq!(first.headers(), second.headers());
        assert_eq!(
            first.headers(),
            &["Sample", "H_Score", "Positive_Cell_Percentage"]
        );
    }

    #[test]
    fn cell_types_are_inferred() {
        let file = write_csv("Sample,Value,Flag\nA1,12.5,true\nB2,,False\nC3,7,x\n");
        let table = load_csv(file.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(0, "Value"), Some(&CellValue::Float(12.5)));
        assert_eq!(table.cell(1, "Value"), Some(&CellValue::Null));
        assert_eq!(table.cell(2, "Value"), Some(&CellValue::Integer(7)));
        assert_eq!(table.cell(0, "Flag"), Some(&CellValue::Bool(true)));
        assert_eq!(table.cell(1, "Flag"), Some(&CellValue::Bool(false)));
        assert_eq!(table.cell(2, "Flag"), Some(&CellValue::Text("x".into())));
    }

    #[test]
    fn text_cells_keep_their_whitespace() {
        let file = write_csv("Sample,Value\n A1 , 12 \n");
        let table = load_csv(file.path()).unwrap();
        assert_eq!(table.cell(0, "Sample"), Some(&CellValue::Text(" A1 ".into())));
        assert_eq!(table.cell(0, "Value"), Some(&CellValue::Integer(12)));
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ChartError::InputNotFound(_)));
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let file = write_csv("Sample,Value\nA1,1,extra\n");
        let err = load_csv(file.path()).unwrap_err();
        assert!(matches!(err, ChartError::Parse { .. }));
    }

    #[test]
    fn first_csv_is_picked_by_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.csv"), "x\n1\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        let found = find_first_csv(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "a.csv");
    }

    #[test]
    fn empty_data_dir_is_input_not_found() {
        let dir = TempDir::new().unwrap();
        let err = find_first_csv(dir.path()).unwrap_err();
        assert!(matches!(err, ChartError::InputNotFound(_)));
    }
}
