//! Per-column numeric type coercion.
//!
//! Two passes per column: a profiling pass counts how many non-null values
//! parse as numbers, then an apply pass rewrites the column once a type is
//! chosen. Never fails; a column that cannot be confidently typed stays Text.

use std::collections::BTreeSet;

use cleansheet_model::{CellValue, Column, ColumnType, NullFill, format_numeric, parse_f64};

/// Share of a column's non-null values that parse as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnTypeProfile {
    pub non_null: usize,
    pub parsed: usize,
}

impl ColumnTypeProfile {
    pub fn numeric_ratio(self) -> f64 {
        if self.non_null == 0 {
            0.0
        } else {
            self.parsed as f64 / self.non_null as f64
        }
    }

    /// The ratio must strictly exceed the threshold to reclassify.
    pub fn choose(self, threshold: f64) -> ColumnType {
        if self.numeric_ratio() > threshold {
            ColumnType::Numeric
        } else {
            ColumnType::Text
        }
    }
}

/// Parses a cell as a number, stripping comma thousands separators and
/// surrounding whitespace from text cells.
pub fn parse_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(v) => Some(*v),
        CellValue::Text(s) => parse_f64(&s.trim().replace(',', "")),
        CellValue::Null => None,
    }
}

pub fn profile_column(rows: &[Vec<CellValue>], index: usize) -> ColumnTypeProfile {
    let mut profile = ColumnTypeProfile {
        non_null: 0,
        parsed: 0,
    };
    for row in rows {
        let cell = &row[index];
        if cell.is_null() {
            continue;
        }
        profile.non_null += 1;
        if parse_number(cell).is_some() {
            profile.parsed += 1;
        }
    }
    profile
}

fn apply_column_type(
    rows: &mut [Vec<CellValue>],
    index: usize,
    ty: ColumnType,
    null_fill: NullFill,
) {
    for row in rows {
        let cell = &mut row[index];
        *cell = match ty {
            ColumnType::Numeric => match parse_number(cell) {
                Some(v) => CellValue::Number(v),
                None => match null_fill {
                    NullFill::Keep => CellValue::Null,
                    NullFill::Zero => CellValue::Number(0.0),
                },
            },
            ColumnType::Text => match &*cell {
                CellValue::Number(v) => CellValue::Text(format_numeric(*v)),
                other => other.clone(),
            },
        };
    }
}

/// Profiles and rewrites every column, updating each column's type in place.
/// Returns the names of the columns reclassified as numeric.
pub fn coerce_columns(
    columns: &mut [Column],
    rows: &mut [Vec<CellValue>],
    threshold: f64,
    null_fill: NullFill,
) -> BTreeSet<String> {
    let mut numeric = BTreeSet::new();
    for index in 0..columns.len() {
        let profile = profile_column(rows, index);
        let ty = profile.choose(threshold);
        apply_column_type(rows, index, ty, null_fill);
        columns[index].ty = ty;
        if ty == ColumnType::Numeric {
            numeric.insert(columns[index].name.clone());
        }
    }
    numeric
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str) -> Column {
        Column {
            name: name.to_string(),
            ty: ColumnType::Text,
        }
    }

    fn text_rows(values: &[&str]) -> Vec<Vec<CellValue>> {
        values
            .iter()
            .map(|value| vec![CellValue::from_text(value)])
            .collect()
    }

    #[test]
    fn thousands_separators_are_stripped() {
        assert_eq!(
            parse_number(&CellValue::Text("1,200".to_string())),
            Some(1200.0)
        );
        assert_eq!(
            parse_number(&CellValue::Text(" 2,500.75 ".to_string())),
            Some(2500.75)
        );
        assert_eq!(parse_number(&CellValue::Text("n/a".to_string())), None);
    }

    #[test]
    fn mostly_numeric_column_is_reclassified() {
        let mut columns = vec![column("Hours")];
        let mut rows = text_rows(&["1,200", "850", "n/a", "200"]);
        let profile = profile_column(&rows, 0);
        assert_eq!(profile.non_null, 4);
        assert_eq!(profile.parsed, 3);
        assert!((profile.numeric_ratio() - 0.75).abs() < 1e-9);

        let numeric = coerce_columns(&mut columns, &mut rows, 0.2, NullFill::Keep);
        assert!(numeric.contains("Hours"));
        assert_eq!(columns[0].ty, ColumnType::Numeric);
        let values: Vec<CellValue> = rows.into_iter().map(|mut row| row.remove(0)).collect();
        assert_eq!(values, vec![
            CellValue::Number(1200.0),
            CellValue::Number(850.0),
            CellValue::Null,
            CellValue::Number(200.0),
        ]);
    }

    #[test]
    fn below_threshold_column_stays_text() {
        let mut columns = vec![column("Notes")];
        let mut rows = text_rows(&["ok", "pending", "7", "review", "done", "later"]);
        let numeric = coerce_columns(&mut columns, &mut rows, 0.2, NullFill::Keep);
        assert!(numeric.is_empty());
        assert_eq!(columns[0].ty, ColumnType::Text);
        assert_eq!(rows[2][0], CellValue::Text("7".to_string()));
    }

    #[test]
    fn zero_fill_replaces_unparsed_values() {
        let mut columns = vec![column("Hours")];
        let mut rows = text_rows(&["5", "n/a", ""]);
        coerce_columns(&mut columns, &mut rows, 0.05, NullFill::Zero);
        let values: Vec<&CellValue> = rows.iter().map(|row| &row[0]).collect();
        assert_eq!(values, vec![
            &CellValue::Number(5.0),
            &CellValue::Number(0.0),
            &CellValue::Number(0.0),
        ]);
    }

    #[test]
    fn spreadsheet_numbers_render_as_text_in_text_columns() {
        let mut columns = vec![column("Label")];
        let mut rows = vec![
            vec![CellValue::Text("alpha".to_string())],
            vec![CellValue::Text("beta".to_string())],
            vec![CellValue::Text("gamma".to_string())],
            vec![CellValue::Number(10.0)],
        ];
        coerce_columns(&mut columns, &mut rows, 0.3, NullFill::Keep);
        assert_eq!(columns[0].ty, ColumnType::Text);
        assert_eq!(rows[3][0], CellValue::Text("10".to_string()));
    }
}
