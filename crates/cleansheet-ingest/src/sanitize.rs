//! Column name cleanup: glyph stripping, placeholder naming, uniqueness.

use std::collections::BTreeSet;
use std::collections::HashSet;

use cleansheet_model::{CellValue, IngestOptions, format_numeric};

/// Strips decorative glyphs and a UTF-8 BOM, trims, and collapses internal
/// whitespace runs to single spaces.
pub fn sanitize_name(raw: &str, glyphs: &BTreeSet<String>) -> String {
    let mut cleaned = raw.trim_matches('\u{feff}').to_string();
    for glyph in glyphs {
        if !glyph.is_empty() {
            cleaned = cleaned.replace(glyph.as_str(), "");
        }
    }
    let mut parts = cleaned.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

/// Renders a header cell as a sanitized name; null cells render empty.
pub fn header_text(cell: &CellValue, options: &IngestOptions) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::Text(s) => sanitize_name(s, &options.decorative_glyphs),
        CellValue::Number(v) => sanitize_name(&format_numeric(*v), &options.decorative_glyphs),
    }
}

/// True for names that carry no information: blanks and export artifacts
/// like pandas' "Unnamed: 3".
pub fn is_placeholder_label(name: &str) -> bool {
    name.is_empty() || name.to_lowercase().starts_with("unnamed")
}

fn placeholder_name(index: usize) -> String {
    format!("Column {}", index + 1)
}

/// Replaces placeholder names with positional ones and makes every name
/// unique by appending " (2)", " (3)", … to later duplicates.
pub fn finalize_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let base = if is_placeholder_label(&name) {
                placeholder_name(index)
            } else {
                name
            };
            let mut unique = base.clone();
            let mut suffix = 2usize;
            while seen.contains(&unique) {
                unique = format!("{base} ({suffix})");
                suffix += 1;
            }
            seen.insert(unique.clone());
            unique
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn glyphs() -> BTreeSet<String> {
        ["\u{2191}".to_string(), "\u{2192}".to_string()]
            .into_iter()
            .collect()
    }

    #[test]
    fn strips_glyphs_and_collapses_whitespace() {
        assert_eq!(sanitize_name(" Total \u{2191} Hours ", &glyphs()), "Total Hours");
        assert_eq!(sanitize_name("\u{2192}Rate", &glyphs()), "Rate");
        assert_eq!(sanitize_name("\u{feff}Name", &glyphs()), "Name");
    }

    #[test]
    fn placeholder_labels_are_detected() {
        assert!(is_placeholder_label(""));
        assert!(is_placeholder_label("Unnamed: 3"));
        assert!(!is_placeholder_label("Hours"));
    }

    #[test]
    fn blank_names_get_positional_placeholders() {
        let names = finalize_names(vec![
            "Name".to_string(),
            String::new(),
            "Unnamed: 2".to_string(),
        ]);
        assert_eq!(names, vec!["Name", "Column 2", "Column 3"]);
    }

    #[test]
    fn duplicates_get_positional_suffixes() {
        let names = finalize_names(vec![
            "Billable - Hours".to_string(),
            "Billable - Total".to_string(),
            "Billable - Hours".to_string(),
        ]);
        assert_eq!(names, vec![
            "Billable - Hours",
            "Billable - Total",
            "Billable - Hours (2)",
        ]);
    }

    #[test]
    fn suffixed_collisions_keep_probing() {
        let names = finalize_names(vec![
            "A".to_string(),
            "A (2)".to_string(),
            "A".to_string(),
            "A".to_string(),
        ]);
        assert_eq!(names, vec!["A", "A (2)", "A (3)", "A (4)"]);
    }

    proptest! {
        #[test]
        fn finalized_names_are_unique_and_non_empty(names in proptest::collection::vec(".{0,12}", 0..20)) {
            let finalized = finalize_names(names.clone());
            prop_assert_eq!(finalized.len(), names.len());
            let distinct: HashSet<&String> = finalized.iter().collect();
            prop_assert_eq!(distinct.len(), finalized.len());
            for name in &finalized {
                prop_assert!(!name.is_empty());
            }
        }
    }
}
