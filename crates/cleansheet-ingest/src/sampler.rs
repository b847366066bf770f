//! Raw grid decoding.
//!
//! Reads a delimited or spreadsheet byte stream into an untyped rectangular
//! grid with no header interpretation; every row, including what will become
//! the header, is treated as data. The sampling pass reads a bounded prefix,
//! the re-read pass decodes the whole stream. Both index rows identically
//! (for spreadsheets: positions within the sheet's used range), so a header
//! offset found in the sample is valid against the full grid.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use cleansheet_model::{CellValue, IngestError, SourceFormat};

/// Untyped rectangular grid. Rows are padded with `Null` to the widest row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGrid {
    pub rows: Vec<Vec<CellValue>>,
    pub width: usize,
}

impl RawGrid {
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Null);
        }
        Self { rows, width }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width == 0
    }
}

/// Reads at most `cap` rows from the stream.
pub fn sample_grid(
    bytes: &[u8],
    format: SourceFormat,
    cap: usize,
) -> Result<RawGrid, IngestError> {
    decode(bytes, format, Some(cap))
}

/// Reads the whole stream.
pub fn read_full_grid(bytes: &[u8], format: SourceFormat) -> Result<RawGrid, IngestError> {
    decode(bytes, format, None)
}

fn decode(
    bytes: &[u8],
    format: SourceFormat,
    limit: Option<usize>,
) -> Result<RawGrid, IngestError> {
    let rows = match format {
        SourceFormat::Csv => decode_csv(bytes, limit)?,
        SourceFormat::Spreadsheet => decode_workbook(bytes, limit)?,
    };
    if rows.is_empty() {
        return Err(unreadable(format, "stream contains no rows"));
    }
    Ok(RawGrid::from_rows(rows))
}

fn unreadable(format: SourceFormat, reason: impl Into<String>) -> IngestError {
    IngestError::UnreadableInput {
        format,
        reason: reason.into(),
    }
}

fn decode_csv(bytes: &[u8], limit: Option<usize>) -> Result<Vec<Vec<CellValue>>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| unreadable(SourceFormat::Csv, err.to_string()))?;
        rows.push(record.iter().map(CellValue::from_text).collect());
        if limit.is_some_and(|cap| rows.len() >= cap) {
            break;
        }
    }
    Ok(rows)
}

fn decode_workbook(
    bytes: &[u8],
    limit: Option<usize>,
) -> Result<Vec<Vec<CellValue>>, IngestError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = Xlsx::new(cursor)
        .map_err(|err| unreadable(SourceFormat::Spreadsheet, err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| unreadable(SourceFormat::Spreadsheet, "workbook contains no worksheets"))?
        .map_err(|err| unreadable(SourceFormat::Spreadsheet, err.to_string()))?;
    let mut rows = Vec::new();
    for row in range.rows() {
        rows.push(row.iter().map(cell_from_sheet).collect());
        if limit.is_some_and(|cap| rows.len() >= cap) {
            break;
        }
    }
    Ok(rows)
}

fn cell_from_sheet(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) => CellValue::from_text(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => CellValue::Text(format_timestamp(ts)),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
    }
}

fn format_timestamp(ts: chrono::NaiveDateTime) -> String {
    if ts.time() == chrono::NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_are_padded_to_the_widest_row() {
        let grid = read_full_grid(b"a,b\n1,2,3\nx\n", SourceFormat::Csv).expect("decode");
        assert_eq!(grid.width, 3);
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.rows[0][2], CellValue::Null);
        assert_eq!(grid.rows[2], vec![
            CellValue::Text("x".to_string()),
            CellValue::Null,
            CellValue::Null,
        ]);
    }

    #[test]
    fn sample_respects_the_row_cap() {
        let mut contents = String::from("h1,h2\n");
        for i in 0..60 {
            contents.push_str(&format!("{i},{i}\n"));
        }
        let grid = sample_grid(contents.as_bytes(), SourceFormat::Csv, 50).expect("decode");
        assert_eq!(grid.row_count(), 50);
    }

    #[test]
    fn blank_cells_decode_as_null() {
        let grid = read_full_grid(b"a,,c\n", SourceFormat::Csv).expect("decode");
        assert_eq!(grid.rows[0][1], CellValue::Null);
    }

    #[test]
    fn empty_stream_is_unreadable() {
        let err = read_full_grid(b"", SourceFormat::Csv).unwrap_err();
        assert!(matches!(err, IngestError::UnreadableInput { .. }));
    }

    #[test]
    fn invalid_utf8_is_unreadable() {
        let err = read_full_grid(b"a,b\n\xff\xfe,\x80\n", SourceFormat::Csv).unwrap_err();
        assert!(matches!(
            err,
            IngestError::UnreadableInput {
                format: SourceFormat::Csv,
                ..
            }
        ));
    }

    #[test]
    fn garbage_bytes_are_not_a_workbook() {
        let err = read_full_grid(b"definitely not a zip archive", SourceFormat::Spreadsheet)
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::UnreadableInput {
                format: SourceFormat::Spreadsheet,
                ..
            }
        ));
    }
}
