//! Header location and two-level header flattening.
//!
//! Locating is total: every grid yields an offset, worst case `Defaulted(0)`.
//! The density heuristic assumes header rows are more densely populated than
//! the title/banner rows above them; the keyword heuristic looks for a row
//! carrying a configured key-column label.

use std::collections::BTreeSet;

use cleansheet_model::{
    CellValue, Detected, HeaderMode, HeaderStrategy, IngestOptions, IngestWarning,
};

use crate::sampler::RawGrid;
use crate::sanitize;

/// Where the real table begins and how its header is laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderPlan {
    /// Raw index of the (metric-level) header row.
    pub offset: Detected<usize>,
    pub mode: HeaderMode,
    pub warnings: Vec<IngestWarning>,
}

pub fn locate_header(grid: &RawGrid, options: &IngestOptions) -> HeaderPlan {
    let mut warnings = Vec::new();
    if grid.is_empty() {
        return HeaderPlan {
            offset: Detected::Defaulted(0),
            mode: HeaderMode::SingleRow,
            warnings,
        };
    }

    let offset = match effective_strategy(options) {
        HeaderStrategy::Keyword => match keyword_row(grid, &options.key_column_keywords) {
            Some(index) => Detected::Found(index),
            None => {
                warnings.push(IngestWarning::HeaderKeywordMiss {
                    keywords: options.key_column_keywords.iter().cloned().collect(),
                });
                Detected::Defaulted(densest_row(grid))
            }
        },
        _ => Detected::Found(densest_row(grid)),
    };

    let mode = detect_two_row(grid, *offset.value(), options);
    HeaderPlan {
        offset,
        mode,
        warnings,
    }
}

fn effective_strategy(options: &IngestOptions) -> HeaderStrategy {
    match options.header_strategy {
        HeaderStrategy::Auto => {
            if options.key_column_keywords.is_empty() {
                HeaderStrategy::Density
            } else {
                HeaderStrategy::Keyword
            }
        }
        other => other,
    }
}

/// First row with the maximum count of non-null cells.
fn densest_row(grid: &RawGrid) -> usize {
    let mut best = 0;
    let mut best_count = 0;
    for (index, row) in grid.rows.iter().enumerate() {
        let count = row.iter().filter(|cell| !cell.is_null()).count();
        if count > best_count {
            best = index;
            best_count = count;
        }
    }
    best
}

fn keyword_row(grid: &RawGrid, keywords: &BTreeSet<String>) -> Option<usize> {
    if keywords.is_empty() {
        return None;
    }
    grid.rows
        .iter()
        .position(|row| row.iter().any(|cell| cell_matches_any(cell, keywords)))
}

fn cell_matches_any(cell: &CellValue, keywords: &BTreeSet<String>) -> bool {
    let Some(text) = cell.as_text() else {
        return false;
    };
    let lower = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

/// A row directly above the header that carries a group-label keyword marks
/// a two-level header block.
fn detect_two_row(grid: &RawGrid, offset: usize, options: &IngestOptions) -> HeaderMode {
    if offset == 0 || options.group_label_keywords.is_empty() {
        return HeaderMode::SingleRow;
    }
    let above = &grid.rows[offset - 1];
    if above
        .iter()
        .any(|cell| cell_matches_any(cell, &options.group_label_keywords))
    {
        HeaderMode::TwoRow {
            label_row: offset - 1,
        }
    } else {
        HeaderMode::SingleRow
    }
}

/// Flattens a two-row header block into one name per column.
///
/// The top (group-label) row is forward-filled left to right, both levels are
/// sanitized, and each pair merges per the rules: bottom alone when the group
/// is blank/placeholder or repeats the metric, `"{group} - {metric}"`
/// otherwise. Output length equals the input column count; uniqueness is
/// enforced later by [`sanitize::finalize_names`].
pub fn flatten_two_row(
    top: &[CellValue],
    bottom: &[CellValue],
    options: &IngestOptions,
) -> Vec<String> {
    let filled = forward_fill(top, options);
    filled
        .iter()
        .zip(bottom)
        .map(|(group, metric)| {
            let metric_name = sanitize::header_text(metric, options);
            match group {
                None => metric_name,
                Some(label) if metric_name.is_empty() => label.clone(),
                Some(label) if label.to_lowercase() == metric_name.to_lowercase() => metric_name,
                Some(label) => format!("{label} - {metric_name}"),
            }
        })
        .collect()
}

/// A blank or placeholder group cell inherits the nearest label to its left.
fn forward_fill(top: &[CellValue], options: &IngestOptions) -> Vec<Option<String>> {
    let mut filled = Vec::with_capacity(top.len());
    let mut last: Option<String> = None;
    for cell in top {
        let text = sanitize::header_text(cell, options);
        if !sanitize::is_placeholder_label(&text) {
            last = Some(text);
        }
        filled.push(last.clone());
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|cell| CellValue::from_text(cell)).collect()
    }

    fn grid_with_densities(counts: &[usize], width: usize) -> RawGrid {
        let rows = counts
            .iter()
            .map(|count| {
                (0..width)
                    .map(|i| {
                        if i < *count {
                            CellValue::Text(format!("c{i}"))
                        } else {
                            CellValue::Null
                        }
                    })
                    .collect()
            })
            .collect();
        RawGrid::from_rows(rows)
    }

    #[test]
    fn density_picks_first_maximum() {
        let grid = grid_with_densities(&[2, 2, 7, 7, 7], 7);
        let options = IngestOptions::default().with_header_strategy(HeaderStrategy::Density);
        let plan = locate_header(&grid, &options);
        assert_eq!(plan.offset, Detected::Found(2));
        assert_eq!(plan.mode, HeaderMode::SingleRow);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn keyword_hit_wins_over_density() {
        let grid = RawGrid::from_rows(vec![
            text_row(&["Quarterly Report", "", "", ""]),
            text_row(&["Name", "Hours", "Rate", "Notes"]),
            text_row(&["Ana", "5", "10", "ok"]),
        ]);
        let plan = locate_header(&grid, &IngestOptions::default());
        assert_eq!(plan.offset, Detected::Found(1));
    }

    #[test]
    fn keyword_miss_falls_back_to_density_with_warning() {
        let grid = RawGrid::from_rows(vec![
            text_row(&["Title", "", ""]),
            text_row(&["Owner", "Hours", "Rate"]),
            text_row(&["Ana", "5", "10"]),
        ]);
        let options = IngestOptions::default().with_key_column_keywords(&["empleado"]);
        let plan = locate_header(&grid, &options);
        assert_eq!(plan.offset, Detected::Defaulted(1));
        assert!(matches!(
            plan.warnings.as_slice(),
            [IngestWarning::HeaderKeywordMiss { .. }]
        ));
    }

    #[test]
    fn empty_grid_defaults_to_offset_zero() {
        let plan = locate_header(&RawGrid::from_rows(Vec::new()), &IngestOptions::default());
        assert_eq!(plan.offset, Detected::Defaulted(0));
    }

    #[test]
    fn group_label_row_above_header_marks_two_row_mode() {
        let grid = RawGrid::from_rows(vec![
            text_row(&["", "Billable", "", "Internal"]),
            text_row(&["Name", "Hours", "Rate", "Hours"]),
            text_row(&["Ana", "5", "10", "2"]),
        ]);
        let options = IngestOptions::default().with_group_label_keywords(&["billable"]);
        let plan = locate_header(&grid, &options);
        assert_eq!(plan.offset, Detected::Found(1));
        assert_eq!(plan.mode, HeaderMode::TwoRow { label_row: 0 });
    }

    #[test]
    fn flatten_forward_fills_gaps_in_the_group_row() {
        let options = IngestOptions::default();
        let top = vec![
            CellValue::Text("Billable".to_string()),
            CellValue::Null,
            CellValue::Null,
        ];
        let bottom = text_row(&["Hours", "Total", "Hours"]);
        let flat = flatten_two_row(&top, &bottom, &options);
        assert_eq!(flat, vec![
            "Billable - Hours",
            "Billable - Total",
            "Billable - Hours",
        ]);
    }

    #[test]
    fn flatten_collapses_equal_group_and_metric() {
        let options = IngestOptions::default();
        let flat = flatten_two_row(
            &text_row(&["Name", "Billable"]),
            &text_row(&["name", "Hours"]),
            &options,
        );
        assert_eq!(flat, vec!["name", "Billable - Hours"]);
    }

    #[test]
    fn flatten_uses_bottom_alone_before_the_first_group_label() {
        let options = IngestOptions::default();
        let flat = flatten_two_row(
            &text_row(&["", "Billable"]),
            &text_row(&["Name", "Hours"]),
            &options,
        );
        assert_eq!(flat, vec!["Name", "Billable - Hours"]);
    }
}
