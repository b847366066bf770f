pub mod error;
pub mod metadata;
pub mod numeric;
pub mod options;
pub mod table;

pub use error::{IngestError, Result};
pub use metadata::{Detected, HeaderMode, IngestWarning, Metadata};
pub use numeric::{format_numeric, parse_f64};
pub use options::{HeaderStrategy, IngestOptions, NullFill, SourceFormat};
pub use table::{CellValue, CleanTable, Column, ColumnType};
