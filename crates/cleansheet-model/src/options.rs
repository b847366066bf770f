//! Configuration for the ingestion pipeline.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Format hint for the raw byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Maps a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("csv") {
            Some(SourceFormat::Csv)
        } else if ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm") {
            Some(SourceFormat::Spreadsheet)
        } else {
            None
        }
    }

    /// Maps a file name (e.g. an upload name) to a format via its extension.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.').map(|(_, ext)| ext)?;
        Self::from_extension(ext)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "CSV"),
            SourceFormat::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

/// What to do with cells of a numeric column that did not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NullFill {
    /// Leave unparsed and missing values as null.
    #[default]
    Keep,
    /// Replace unparsed and missing values with zero.
    Zero,
}

/// Strategy for locating the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeaderStrategy {
    /// Keyword scan when key-column keywords are configured, density otherwise.
    #[default]
    Auto,
    /// Row with the maximum count of non-null cells, earliest on ties.
    Density,
    /// First row containing a key-column keyword, density on miss.
    Keyword,
}

/// Ingestion configuration.
///
/// All keyword matching is case-insensitive substring matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Maximum rows read during the sampling pass.
    pub sample_row_cap: usize,
    pub header_strategy: HeaderStrategy,
    /// Report-formatting artifacts stripped from header names.
    pub decorative_glyphs: BTreeSet<String>,
    /// Keywords marking a group-label row above the header. Two-row header
    /// detection is off while this set is empty.
    pub group_label_keywords: BTreeSet<String>,
    /// Keywords identifying the key ("name"/"owner") column.
    pub key_column_keywords: BTreeSet<String>,
    /// Keywords identifying default metric columns for downstream charting.
    pub metric_keywords: BTreeSet<String>,
    /// Markers identifying subtotal/total rows by their key value.
    pub noise_markers: BTreeSet<String>,
    /// Minimum fraction of parseable values required to reclassify a column
    /// as numeric. The ratio must strictly exceed this value.
    pub numeric_threshold: f64,
    pub null_fill: NullFill,
}

fn keyword_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            sample_row_cap: 50,
            header_strategy: HeaderStrategy::default(),
            decorative_glyphs: keyword_set(&["\u{2191}", "\u{2192}"]),
            group_label_keywords: BTreeSet::new(),
            key_column_keywords: keyword_set(&["name", "nombre"]),
            metric_keywords: keyword_set(&["hour", "hora"]),
            noise_markers: keyword_set(&["subtotal", "total"]),
            numeric_threshold: 0.2,
            null_fill: NullFill::Keep,
        }
    }
}

impl IngestOptions {
    /// Plain ingestion profile: conservative numeric acceptance, nulls kept.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Executive-report profile: aggressive numeric acceptance and zero
    /// filling, for reports where sparse numeric columns are the norm.
    pub fn executive() -> Self {
        Self {
            numeric_threshold: 0.05,
            null_fill: NullFill::Zero,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sample_row_cap(mut self, cap: usize) -> Self {
        self.sample_row_cap = cap;
        self
    }

    #[must_use]
    pub fn with_header_strategy(mut self, strategy: HeaderStrategy) -> Self {
        self.header_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_group_label_keywords(mut self, keywords: &[&str]) -> Self {
        self.group_label_keywords = keyword_set(keywords);
        self
    }

    #[must_use]
    pub fn with_key_column_keywords(mut self, keywords: &[&str]) -> Self {
        self.key_column_keywords = keyword_set(keywords);
        self
    }

    #[must_use]
    pub fn with_noise_markers(mut self, markers: &[&str]) -> Self {
        self.noise_markers = keyword_set(markers);
        self
    }

    #[must_use]
    pub fn with_numeric_threshold(mut self, threshold: f64) -> Self {
        self.numeric_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_null_fill(mut self, fill: NullFill) -> Self {
        self.null_fill = fill;
        self
    }
}
