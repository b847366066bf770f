//! Noise row removal: subtotal/total markers and null keys.

use std::collections::BTreeSet;

use cleansheet_model::{CellValue, Column, ColumnType, Detected};

/// Picks the key ("name"/"owner") column: the first Text column whose name
/// contains a key keyword, else the first Text column as a best-effort
/// default, else nothing.
pub fn guess_key_column(
    columns: &[Column],
    keywords: &BTreeSet<String>,
) -> Option<Detected<usize>> {
    let keyword_hit = columns
        .iter()
        .position(|col| col.ty == ColumnType::Text && name_matches(col, keywords));
    if let Some(index) = keyword_hit {
        return Some(Detected::Found(index));
    }
    columns
        .iter()
        .position(|col| col.ty == ColumnType::Text)
        .map(Detected::Defaulted)
}

fn name_matches(column: &Column, keywords: &BTreeSet<String>) -> bool {
    let lower = column.name.to_lowercase();
    keywords
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

/// Drops rows that are structurally not data: fully-null rows always, plus
/// (when a key column is known) rows whose key is null or carries a noise
/// marker. Returns the number of rows removed.
pub fn filter_noise_rows(
    rows: &mut Vec<Vec<CellValue>>,
    key_index: Option<usize>,
    noise_markers: &BTreeSet<String>,
) -> usize {
    let before = rows.len();
    rows.retain(|row| {
        if row.iter().all(CellValue::is_null) {
            return false;
        }
        let Some(index) = key_index else {
            return true;
        };
        match &row[index] {
            CellValue::Null => false,
            CellValue::Number(_) => true,
            CellValue::Text(text) => {
                let lower = text.to_lowercase();
                !noise_markers
                    .iter()
                    .any(|marker| lower.contains(&marker.to_lowercase()))
            }
        }
    });
    before - rows.len()
}
