use std::collections::HashMap;

use crate::{MergedRow, ResultEntry, Row};

/// Joins backend results onto the rows held since submission.
///
/// Produces exactly one `MergedRow` per input row, in input order. Rows the
/// backend did not return a verdict for get `result: None`. Duplicate rows
/// share the same verdict; if the backend repeats an address the first entry
/// wins.
pub fn merge_results(rows: &[Row], results: Vec<ResultEntry>) -> Vec<MergedRow> {
    let mut lookup = HashMap::with_capacity(results.len());
    for entry in results {
        if let Some(result) = entry.result {
            lookup.entry(entry.email.to_lowercase()).or_insert(result);
        }
    }

    rows.iter()
        .map(|row| MergedRow {
            row: row.clone(),
            result: lookup.get(row.email()).cloned(),
        })
        .collect()
}
