use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, inferred per cell when the CSV is parsed.
/// `Null` is the explicit "no data" marker; blanked rows are all `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell; `None` for text, bools, nulls, NaN and infinities.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text view of the cell, the way a sample id or group label is read.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Float(v) if v.is_nan() => None,
            other => Some(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// SampleRecord – one (sample id, measurement) pair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub sample_id: String,
    /// `None` when the measurement is absent.
    pub value: Option<f64>,
}

impl SampleRecord {
    pub fn new(sample_id: impl Into<String>, value: Option<f64>) -> Self {
        SampleRecord {
            sample_id: sample_id.into(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded CSV
// ---------------------------------------------------------------------------

/// Column-major table. All columns hold exactly `n_rows` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Vec<CellValue>>,
    n_rows: usize,
}

impl Table {
    /// Build a table from headers and row-major cells.
    /// Short rows are padded with `Null`, long rows truncated.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let n_rows = rows.len();
        let mut columns: Vec<Vec<CellValue>> = headers
            .iter()
            .map(|_| Vec::with_capacity(n_rows))
            .collect();
        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.push(cells.next().unwrap_or(CellValue::Null));
            }
        }
        Table {
            headers,
            columns,
            n_rows,
        }
    }

    /// Normalized header names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.column_index(name).map(|i| self.columns[i].as_slice())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column(column).and_then(|c| c.get(row))
    }

    /// Numeric view of a column, `None` where the cell is not a number.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name)
            .map(|cells| cells.iter().map(CellValue::as_f64).collect())
    }

    /// Text view of a column, `None` where the cell is null.
    pub fn text_column(&self, name: &str) -> Option<Vec<Option<String>>> {
        self.column(name)
            .map(|cells| cells.iter().map(CellValue::as_text).collect())
    }

    /// Set every cell of row `row` to `Null`.
    pub fn blank_row(&mut self, row: usize) {
        for column in &mut self.columns {
            if let Some(cell) = column.get_mut(row) {
                *cell = CellValue::Null;
            }
        }
    }

    /// A copy holding only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|col| indices.iter().filter_map(|&i| col.get(i).cloned()).collect())
            .collect();
        Table {
            headers: self.headers.clone(),
            columns,
            n_rows: indices.iter().filter(|&&i| i < self.n_rows).count(),
        }
    }
}
