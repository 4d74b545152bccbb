//! Option discovery: the choices a front end can offer for each chart,
//! read straight from the dataset and serialized as JSON.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;

use crate::data::columns::first_column;
use crate::data::model::Table;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Heatmap,
    BoxPlot,
    Histogram,
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heatmap" => Ok(ChartKind::Heatmap),
            "boxplot" | "box_and_scatter" | "box_whisker" => Ok(ChartKind::BoxPlot),
            "histogram" => Ok(ChartKind::Histogram),
            other => Err(format!(
                "unknown chart type '{other}' (expected heatmap|boxplot|histogram)"
            )),
        }
    }
}

/// Only the fields relevant to the requested chart are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_letters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_numbers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_groups: Option<Vec<String>>,
}

impl ChartOptions {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub fn discover(table: &Table, kind: ChartKind) -> Result<ChartOptions> {
    let options = match kind {
        ChartKind::Heatmap => {
            let ids = sample_ids(table)?;
            let (letters, numbers) = grid_axes(&ids);
            ChartOptions {
                row_letters: Some(letters),
                col_numbers: Some(numbers),
                ..ChartOptions::default()
            }
        }
        ChartKind::BoxPlot => ChartOptions {
            columns: Some(value_columns(table)),
            ..ChartOptions::default()
        },
        ChartKind::Histogram => ChartOptions {
            letter_groups: Some(letter_groups(&sample_ids(table)?)),
            ..ChartOptions::default()
        },
    };
    log::debug!("Discovered options for {kind:?}: {options:?}");
    Ok(options)
}

fn sample_ids(table: &Table) -> Result<Vec<String>> {
    let sample_col = first_column(table)?;
    Ok(table
        .text_column(&sample_col)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect())
}

/// Every letter seen in any id (uppercased, sorted) and every digit run
/// (numeric order).
fn grid_axes(ids: &[String]) -> (Vec<String>, Vec<String>) {
    let mut letters = BTreeSet::new();
    let mut numbers = BTreeSet::new();
    for id in ids {
        letters.extend(
            id.chars()
                .filter(char::is_ascii_alphabetic)
                .map(|c| c.to_ascii_uppercase().to_string()),
        );
        numbers.extend(
            id.split(|c: char| !c.is_ascii_digit())
                .filter(|run| !run.is_empty())
                .map(str::to_string),
        );
    }
    let mut numbers: Vec<String> = numbers.into_iter().collect();
    numbers.sort_by_key(|n| n.parse::<u64>().unwrap_or(u64::MAX));
    (letters.into_iter().collect(), numbers)
}

/// Headers other than the sample and group columns.
fn value_columns(table: &Table) -> Vec<String> {
    table
        .headers()
        .iter()
        .filter(|h| !matches!(h.to_ascii_lowercase().as_str(), "sample" | "group"))
        .cloned()
        .collect()
}

fn letter_groups(ids: &[String]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| id.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .filter(char::is_ascii_uppercase)
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn table() -> Table {
        Table::from_rows(
            vec!["Sample".into(), "Group".into(), "Positive_Area_Percentage".into()],
            ["b10", "A2", "A1", "C2", "1x"]
                .iter()
                .map(|id| {
                    vec![
                        CellValue::Text(id.to_string()),
                        CellValue::Text("Tumor".into()),
                        CellValue::Float(1.0),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn heatmap_axes() {
        let options = discover(&table(), ChartKind::Heatmap).unwrap();
        assert_eq!(options.row_letters.unwrap(), vec!["A", "B", "C", "X"]);
        assert_eq!(options.col_numbers.unwrap(), vec!["1", "2", "10"]);
    }

    #[test]
    fn boxplot_columns_skip_sample_and_group() {
        let options = discover(&table(), ChartKind::BoxPlot).unwrap();
        assert_eq!(options.columns.unwrap(), vec!["Positive_Area_Percentage"]);
    }

    #[test]
    fn histogram_letter_groups_use_first_letter() {
        let options = discover(&table(), ChartKind::Histogram).unwrap();
        assert_eq!(options.letter_groups.unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn json_only_carries_relevant_keys() {
        let json = discover(&table(), ChartKind::Histogram)
            .unwrap()
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"letterGroups":["A","B","C"]}"#);
    }

    #[test]
    fn kinds_parse_with_legacy_names() {
        assert_eq!("box_whisker".parse::<ChartKind>().unwrap(), ChartKind::BoxPlot);
        assert!("pie".parse::<ChartKind>().is_err());
    }
}
