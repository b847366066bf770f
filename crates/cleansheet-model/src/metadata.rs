//! Descriptive record of how a table was derived.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a heuristic decision.
///
/// `Found` means the heuristic located the value with confidence; `Defaulted`
/// means the pipeline fell back to a best-effort default. Both carry a usable
/// value, so heuristic steps stay total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Detected<T> {
    Found(T),
    Defaulted(T),
}

impl<T> Detected<T> {
    pub fn value(&self) -> &T {
        match self {
            Detected::Found(v) | Detected::Defaulted(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Detected::Found(v) | Detected::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Detected::Defaulted(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Detected<U> {
        match self {
            Detected::Found(v) => Detected::Found(f(v)),
            Detected::Defaulted(v) => Detected::Defaulted(f(v)),
        }
    }
}

/// How the header block was laid out in the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderMode {
    /// One physical header row.
    SingleRow,
    /// A group-label row directly above the metric-label row. `label_row` is
    /// the raw index of the group-label row; the header offset itself points
    /// at the metric row.
    TwoRow { label_row: usize },
}

impl HeaderMode {
    pub fn is_two_row(&self) -> bool {
        matches!(self, HeaderMode::TwoRow { .. })
    }
}

/// Non-fatal conditions encountered while ingesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestWarning {
    /// No row matched the configured header keywords; the density heuristic
    /// supplied the offset instead.
    HeaderKeywordMiss { keywords: Vec<String> },
    /// No key column could be identified, so noise-row filtering was skipped.
    KeyColumnNotFound,
}

impl fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestWarning::HeaderKeywordMiss { keywords } => write!(
                f,
                "no row matched header keywords [{}]; density fallback used",
                keywords.join(", ")
            ),
            IngestWarning::KeyColumnNotFound => {
                write!(f, "no key column identified; noise rows were not filtered")
            }
        }
    }
}

/// How the clean table was derived. Downstream selection logic reads this to
/// pre-select grouping and metric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Raw row index where the (metric-level) header was found.
    pub header_offset: Detected<usize>,
    pub header_mode: HeaderMode,
    /// Name of the column used as the row key, when one was identified.
    pub key_column: Option<Detected<String>>,
    /// Names of columns reclassified as numeric.
    pub numeric_columns: BTreeSet<String>,
    /// Numeric columns whose names match the configured metric keywords,
    /// in column order.
    pub metric_column_guesses: Vec<String>,
    /// Names of columns dropped for being entirely null.
    pub dropped_columns: Vec<String>,
    /// Rows removed as subtotal/total/blank-key noise.
    pub noise_rows_dropped: usize,
    pub warnings: Vec<IngestWarning>,
}
