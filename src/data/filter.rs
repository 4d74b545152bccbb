use std::collections::BTreeSet;

use super::model::{CellValue, Table};
use crate::error::{ChartError, Result};

// ---------------------------------------------------------------------------
// ExclusionSpec – which sample ids to invalidate
// ---------------------------------------------------------------------------

/// A set of exclusion tokens.
///
/// * a one-character token excludes every sample id *containing* it
/// * a longer token excludes only the sample id *equal* to it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSpec {
    tokens: BTreeSet<String>,
}

impl ExclusionSpec {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        ExclusionSpec { tokens }
    }

    /// Parse a comma-separated list such as `"A,B12,C3"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether `sample_id` is excluded by any token.
    pub fn matches(&self, sample_id: &str) -> bool {
        self.tokens.iter().any(|token| {
            if token.chars().count() == 1 {
                sample_id.contains(token.as_str())
            } else {
                sample_id == token
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Row filters
// ---------------------------------------------------------------------------

/// Blank every row whose sample id matches `spec`, in place.
///
/// All columns of a matching row become `Null`; row count and order are kept.
/// Returns the number of rows blanked. A non-empty `spec` against a missing
/// `sample_col` is a `ColumnResolution` error.
pub fn blank_excluded(table: &mut Table, spec: &ExclusionSpec, sample_col: &str) -> Result<usize> {
    if spec.is_empty() {
        return Ok(0);
    }
    let Some(ids) = table.text_column(sample_col) else {
        return Err(ChartError::ColumnResolution {
            pattern: sample_col.to_string(),
            reason: "exclusion requested but the sample column is not in the table".to_string(),
        });
    };

    let mut blanked = 0;
    for (row, id) in ids.iter().enumerate() {
        if id.as_deref().is_some_and(|id| spec.matches(id)) {
            table.blank_row(row);
            blanked += 1;
        }
    }
    log::debug!("Blanked {blanked} excluded rows");
    Ok(blanked)
}

/// Copy of `table` without the rows whose sample id is missing
/// (which includes every row blanked by [`blank_excluded`]).
pub fn drop_blank_samples(table: &Table, sample_col: &str) -> Table {
    let keep = matching_rows(table, sample_col, |cell| !cell.is_null());
    table.select_rows(&keep)
}

/// Keep rows whose sample id contains any of the `groups` tokens.
/// An empty `groups` keeps everything.
pub fn retain_letter_groups(table: &Table, sample_col: &str, groups: &[String]) -> Table {
    if groups.is_empty() {
        return table.clone();
    }
    let keep = matching_rows(table, sample_col, |cell| {
        cell.as_text()
            .is_some_and(|id| groups.iter().any(|g| id.contains(g.as_str())))
    });
    table.select_rows(&keep)
}

/// Keep rows whose `column` value (read as text) is one of `order`.
pub fn retain_in_order(table: &Table, column: &str, order: &[String]) -> Table {
    let keep = matching_rows(table, column, |cell| {
        cell.as_text().is_some_and(|v| order.contains(&v))
    });
    table.select_rows(&keep)
}

fn matching_rows<F>(table: &Table, column: &str, pred: F) -> Vec<usize>
where
    F: Fn(&CellValue) -> bool,
{
    table
        .column(column)
        .map(|cells| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| pred(cell))
                .map(|(i, _)| i)
                .collect()
        })
        .unwrap_or_default()
}
