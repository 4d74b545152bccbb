use regex::RegexBuilder;

use super::model::Table;
use crate::error::{ChartError, Result};

/// Find the single column whose name matches `pattern` (case-insensitive
/// regex search). Zero or several matches are configuration errors.
pub fn resolve_column(table: &Table, pattern: &str) -> Result<String> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ChartError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

    let matches: Vec<&String> = table.headers().iter().filter(|h| re.is_match(h)).collect();
    log::debug!("Columns matching '{pattern}': {matches:?}");

    match matches.as_slice() {
        [single] => Ok((*single).clone()),
        [] => Err(ChartError::ColumnResolution {
            pattern: pattern.to_string(),
            reason: format!("no column matches; available: {:?}", table.headers()),
        }),
        many => Err(ChartError::ColumnResolution {
            pattern: pattern.to_string(),
            reason: format!("expected exactly one matching column, found {many:?}"),
        }),
    }
}

/// Exact-name lookup for columns the caller names directly.
pub fn require_column(table: &Table, name: &str) -> Result<String> {
    if table.column_index(name).is_some() {
        Ok(name.to_string())
    } else {
        Err(ChartError::ColumnResolution {
            pattern: name.to_string(),
            reason: format!("column not in the dataset; available: {:?}", table.headers()),
        })
    }
}

/// The first column, used as the sample id column when none is named.
pub fn first_column(table: &Table) -> Result<String> {
    table
        .headers()
        .first()
        .cloned()
        .ok_or_else(|| ChartError::EmptyData("table has no columns".to_string()))
}
