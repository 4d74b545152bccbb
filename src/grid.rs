//! TMA grid reconstruction.
//!
//! Sample ids encode their slide position: the letters give the row, the
//! digits give the column (`"B12"` → row `B`, column `12`). A flat list of
//! `(sample, value)` records is bucketed by column and reassembled into a
//! `rows × cols` grid, with optional caller-supplied ordering that also acts
//! as a filter.

use std::collections::{BTreeSet, HashMap};

use crate::data::model::SampleRecord;
use crate::data::samples::{col_key, row_key};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How a bucketed record is matched to a grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// The sample id contains both the row key and the column key as
    /// substrings. First match in bucket order wins. Ids such as `A1`/`A12`
    /// or multi-letter prefixes can land in more than one cell.
    #[default]
    Containment,
    /// The id's own letter and digit parts equal the cell's keys.
    Exact,
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "containment" | "contains" => Ok(MatchMode::Containment),
            "exact" | "equality" => Ok(MatchMode::Exact),
            other => Err(format!("unknown match mode '{other}' (expected containment|exact)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridOptions {
    /// Explicit row order; keys not observed in the data are dropped.
    pub row_order: Option<Vec<String>>,
    /// Explicit column order; keys not observed in the data are dropped.
    pub col_order: Option<Vec<String>>,
    /// Append the formatted value to each populated cell's label.
    pub show_labels: bool,
    pub match_mode: MatchMode,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_order: None,
            col_order: None,
            show_labels: true,
            match_mode: MatchMode::Containment,
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub sample_id: String,
    pub value: Option<f64>,
    pub label: String,
}

/// Reconstructed grid plus the axis keys the renderer labels it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub row_keys: Vec<String>,
    pub col_keys: Vec<String>,
    cells: Vec<Vec<Option<GridCell>>>,
}

impl Grid {
    pub fn n_rows(&self) -> usize {
        self.row_keys.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_keys.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.cells.get(row)?.get(col)?.as_ref()
    }

    /// Cell lookup by axis keys.
    pub fn cell_at(&self, row_key: &str, col_key: &str) -> Option<&GridCell> {
        let r = self.row_keys.iter().position(|k| k == row_key)?;
        let c = self.col_keys.iter().position(|k| k == col_key)?;
        self.cell(r, c)
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.cell(row, col).and_then(|c| c.value)
    }

    /// Display label; empty for unpopulated cells.
    pub fn label(&self, row: usize, col: usize) -> &str {
        self.cell(row, col).map(|c| c.label.as_str()).unwrap_or("")
    }

    /// `(min, max)` over all present values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .filter_map(|c| c.as_ref().and_then(|c| c.value))
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn populated_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Reconstruction
// ---------------------------------------------------------------------------

/// Records sharing one column key, in first-seen order. A repeated sample id
/// keeps its position and takes the later value.
#[derive(Default)]
struct Bucket {
    entries: Vec<SampleRecord>,
}

impl Bucket {
    fn insert(&mut self, record: &SampleRecord) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.sample_id == record.sample_id)
        {
            Some(existing) => existing.value = record.value,
            None => self.entries.push(record.clone()),
        }
    }
}

/// Rebuild the TMA grid from flat records.
pub fn build_grid(records: &[SampleRecord], options: &GridOptions) -> Grid {
    let mut buckets: HashMap<String, Bucket> = HashMap::new();
    let mut seen_rows: BTreeSet<String> = BTreeSet::new();

    for record in records {
        let r = row_key(&record.sample_id);
        let c = col_key(&record.sample_id);
        if r.is_empty() || c.is_empty() {
            log::debug!(
                "Sample '{}' has no row letter or column number; left out of the grid",
                record.sample_id
            );
            continue;
        }
        buckets.entry(c).or_default().insert(record);
        seen_rows.insert(r);
    }

    let seen_cols: BTreeSet<String> = buckets.keys().cloned().collect();
    let col_keys = ordered_keys(&seen_cols, options.col_order.as_deref());
    let row_keys = ordered_keys(&seen_rows, options.row_order.as_deref());
    log::debug!("Grid rows {row_keys:?}, columns {col_keys:?}");

    let mut cells: Vec<Vec<Option<GridCell>>> = vec![vec![None; col_keys.len()]; row_keys.len()];

    for (ci, ck) in col_keys.iter().enumerate() {
        let Some(bucket) = buckets.get(ck) else {
            continue;
        };
        for (ri, rk) in row_keys.iter().enumerate() {
            let hit = bucket
                .entries
                .iter()
                .find(|rec| cell_matches(options.match_mode, &rec.sample_id, rk, ck));
            if let Some(rec) = hit {
                cells[ri][ci] = Some(GridCell {
                    sample_id: rec.sample_id.clone(),
                    value: rec.value,
                    label: cell_label(&rec.sample_id, rec.value, options.show_labels),
                });
            }
        }
    }

    Grid {
        row_keys,
        col_keys,
        cells,
    }
}

fn ordered_keys(observed: &BTreeSet<String>, order: Option<&[String]>) -> Vec<String> {
    match order {
        Some(order) if !order.is_empty() => {
            let mut keys: Vec<String> = Vec::new();
            for key in order.iter().map(|k| k.trim()) {
                if observed.contains(key) && !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
            keys
        }
        _ => observed.iter().cloned().collect(),
    }
}

fn cell_matches(mode: MatchMode, sample_id: &str, rk: &str, ck: &str) -> bool {
    match mode {
        MatchMode::Containment => sample_id.contains(rk) && sample_id.contains(ck),
        MatchMode::Exact => row_key(sample_id) == rk && col_key(sample_id) == ck,
    }
}

fn cell_label(sample_id: &str, value: Option<f64>, show_labels: bool) -> String {
    match value {
        Some(v) if show_labels => format!("{sample_id}: {v:.2}%"),
        _ => sample_id.to_string(),
    }
}
