//! Sample id conventions: a letter part (grid row) and a digit part (grid
//! column). Characters that are neither are ignored.

use super::model::SampleRecord;
use crate::error::{ChartError, Result};

/// All alphabetic characters of `id`, concatenated, case preserved.
pub fn row_key(id: &str) -> String {
    id.chars().filter(|c| c.is_alphabetic()).collect()
}

/// All ASCII digits of `id`, concatenated.
pub fn col_key(id: &str) -> String {
    id.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Sort key: numeric part first, then letters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SampleKey {
    pub number: u64,
    pub letters: String,
}

impl SampleKey {
    pub fn parse(id: &str) -> Result<Self> {
        let digits = col_key(id);
        if digits.is_empty() {
            return Err(ChartError::SampleIdFormat {
                id: id.to_string(),
                reason: "no digits to order by".to_string(),
            });
        }
        let number = digits.parse::<u64>().map_err(|e| ChartError::SampleIdFormat {
            id: id.to_string(),
            reason: format!("numeric part '{digits}': {e}"),
        })?;
        Ok(SampleKey {
            number,
            letters: row_key(id),
        })
    }
}

/// Order sample ids by (numeric part, letter part). Stable for equal keys.
///
/// `["B12", "A1", "A2", "B1"]` sorts to `["A1", "B1", "A2", "B12"]`.
pub fn sort_samples<S: AsRef<str>>(ids: &[S]) -> Result<Vec<String>> {
    let mut keyed = ids
        .iter()
        .map(|id| SampleKey::parse(id.as_ref()).map(|k| (k, id.as_ref().to_string())))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, id)| id).collect())
}

/// Reorder records by their sample ids, with the same key as [`sort_samples`].
pub fn sort_records(records: Vec<SampleRecord>) -> Result<Vec<SampleRecord>> {
    let mut keyed = records
        .into_iter()
        .map(|r| SampleKey::parse(&r.sample_id).map(|k| (k, r)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, r)| r).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_part_orders_first() {
        let sorted = sort_samples(&["B12", "A1", "A2", "B1"]).unwrap();
        assert_eq!(sorted, vec!["A1", "B1", "A2", "B12"]);
    }

    #[test]
    fn separators_are_ignored() {
        assert_eq!(row_key("B-12"), "B");
        assert_eq!(col_key("B-12"), "12");
        assert_eq!(row_key("aB 3"), "aB");
        let sorted = sort_samples(&["C_10", "c-2", "A 10"]).unwrap();
        assert_eq!(sorted, vec!["c-2", "A 10", "C_10"]);
    }

    #[test]
    fn leading_zeros_compare_numerically() {
        let sorted = sort_samples(&["A10", "A02", "B2"]).unwrap();
        assert_eq!(sorted, vec!["A02", "B2", "A10"]);
    }

    #[test]
    fn id_without_digits_fails() {
        let err = sort_samples(&["A1", "Control"]).unwrap_err();
        match err {
            ChartError::SampleIdFormat { id, .. } => assert_eq!(id, "Control"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn records_follow_sample_order() {
        let records = vec![
            SampleRecord::new("B2", Some(4.0)),
            SampleRecord::new("A2", Some(3.0)),
            SampleRecord::new("A1", None),
        ];
        let sorted = sort_records(records).unwrap();
        let ids: Vec<&str> = sorted.iter().map(|r| r.sample_id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "A2", "B2"]);
        assert_eq!(sorted[0].value, None);
    }
}
