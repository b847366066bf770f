use std::path::PathBuf;

use thiserror::Error;

use crate::options::SourceFormat;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The stream could not be decoded into a rectangular grid at all.
    #[error("input could not be read as a {format} table: {reason}")]
    UnreadableInput {
        format: SourceFormat,
        reason: String,
    },
    /// Cleaning left zero rows or zero usable columns.
    #[error("ingestion produced no usable data: {reason}")]
    EmptyResult { reason: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
