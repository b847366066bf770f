//! Ingestion orchestrator.
//!
//! Sequences the pipeline over one source:
//! Sampling → LocatingHeader → (Flattening) → ReReading → Sanitizing →
//! Coercing → Filtering → Done. Only the two read stages can fail with
//! [`IngestError::UnreadableInput`]; the final emptiness check raises
//! [`IngestError::EmptyResult`]. Every heuristic stage is total and records
//! fallbacks as `Defaulted` outcomes and warnings in [`Metadata`] instead of
//! failing.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use cleansheet_model::{
    CellValue, CleanTable, Column, ColumnType, HeaderMode, IngestError, IngestOptions,
    IngestWarning, Metadata, SourceFormat,
};

use crate::{coerce, filter, header, sampler, sanitize};

/// A re-readable in-memory source plus its format hint.
#[derive(Debug, Clone)]
pub struct TableSource {
    bytes: Vec<u8>,
    format: SourceFormat,
}

impl TableSource {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, format: SourceFormat) -> Self {
        Self {
            bytes: bytes.into(),
            format,
        }
    }

    /// Builds a source from an upload-style name and its bytes. Unknown
    /// extensions fall back to CSV.
    pub fn from_named_bytes(name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let format = SourceFormat::from_name(name).unwrap_or(SourceFormat::Csv);
        Self::from_bytes(bytes, format)
    }

    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let format = path
            .extension()
            .and_then(OsStr::to_str)
            .and_then(SourceFormat::from_extension)
            .unwrap_or(SourceFormat::Csv);
        let bytes = fs::read(path).map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { bytes, format })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

/// Runs the whole pipeline over one source.
pub fn ingest(
    source: &TableSource,
    options: &IngestOptions,
) -> Result<(CleanTable, Metadata), IngestError> {
    // Sampling: bounded prefix, no header interpretation.
    let sample = sampler::sample_grid(source.bytes(), source.format(), options.sample_row_cap)?;

    // LocatingHeader: total, worst case Defaulted(0).
    let plan = header::locate_header(&sample, options);
    let mut warnings = plan.warnings.clone();
    let offset = *plan.offset.value();
    debug!(
        offset,
        defaulted = plan.offset.is_defaulted(),
        two_row = plan.mode.is_two_row(),
        "located header row"
    );

    // ReReading: full stream, then split at the header offset.
    let full = sampler::read_full_grid(source.bytes(), source.format())?;

    let mut names = match plan.mode {
        HeaderMode::TwoRow { label_row } => {
            header::flatten_two_row(&full.rows[label_row], &full.rows[offset], options)
        }
        HeaderMode::SingleRow => full
            .rows
            .get(offset)
            .map(|row| {
                row.iter()
                    .map(|cell| sanitize::header_text(cell, options))
                    .collect()
            })
            .unwrap_or_default(),
    };
    names.resize(full.width, String::new());
    let names = sanitize::finalize_names(names);

    let mut rows: Vec<Vec<CellValue>> = full.rows.into_iter().skip(offset + 1).collect();
    if rows.is_empty() {
        return Err(IngestError::EmptyResult {
            reason: "no data rows below the header".to_string(),
        });
    }

    // Sanitizing: drop columns that are null across the full data extent.
    let keep: Vec<bool> = (0..names.len())
        .map(|index| rows.iter().any(|row| !row[index].is_null()))
        .collect();
    let dropped_columns: Vec<String> = names
        .iter()
        .zip(&keep)
        .filter(|(_, keep)| !**keep)
        .map(|(name, _)| name.clone())
        .collect();
    if !dropped_columns.is_empty() {
        debug!(count = dropped_columns.len(), "dropped all-null columns");
        rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&keep)
                    .filter(|(_, keep)| **keep)
                    .map(|(cell, _)| cell)
                    .collect()
            })
            .collect();
    }
    let mut columns: Vec<Column> = names
        .into_iter()
        .zip(&keep)
        .filter(|(_, keep)| **keep)
        .map(|(name, _)| Column {
            name,
            ty: ColumnType::Text,
        })
        .collect();
    if columns.is_empty() {
        return Err(IngestError::EmptyResult {
            reason: "every column is entirely null".to_string(),
        });
    }

    // Coercing: per-column numeric reclassification.
    let numeric_columns = coerce::coerce_columns(
        &mut columns,
        &mut rows,
        options.numeric_threshold,
        options.null_fill,
    );

    // Filtering: subtotal/total and null-key rows.
    let key = filter::guess_key_column(&columns, &options.key_column_keywords);
    if key.is_none() {
        warn!("no key column identified; noise filtering skipped");
        warnings.push(IngestWarning::KeyColumnNotFound);
    }
    let key_index = key.as_ref().map(|detected| *detected.value());
    let noise_rows_dropped =
        filter::filter_noise_rows(&mut rows, key_index, &options.noise_markers);
    if rows.is_empty() {
        return Err(IngestError::EmptyResult {
            reason: format!("all {noise_rows_dropped} data rows were subtotal or blank-key noise"),
        });
    }

    let metric_column_guesses: Vec<String> = columns
        .iter()
        .filter(|col| col.ty == ColumnType::Numeric)
        .filter(|col| {
            let lower = col.name.to_lowercase();
            options
                .metric_keywords
                .iter()
                .any(|keyword| lower.contains(&keyword.to_lowercase()))
        })
        .map(|col| col.name.clone())
        .collect();

    let metadata = Metadata {
        header_offset: plan.offset,
        header_mode: plan.mode,
        key_column: key.map(|detected| detected.map(|index| columns[index].name.clone())),
        numeric_columns,
        metric_column_guesses,
        dropped_columns,
        noise_rows_dropped,
        warnings,
    };
    debug!(
        rows = rows.len(),
        columns = columns.len(),
        "ingestion complete"
    );
    Ok((CleanTable { columns, rows }, metadata))
}

/// Convenience entry point: reads the file, infers the format from its
/// extension (CSV when unknown), and ingests.
pub fn ingest_path(
    path: &Path,
    options: &IngestOptions,
) -> Result<(CleanTable, Metadata), IngestError> {
    let source = TableSource::from_path(path)?;
    ingest(&source, options)
}
