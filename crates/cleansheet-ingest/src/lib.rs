pub mod cache;
pub mod coerce;
pub mod filter;
pub mod header;
pub mod pipeline;
pub mod sampler;
pub mod sanitize;

pub use cache::{CacheKey, IngestCache};
pub use coerce::{ColumnTypeProfile, coerce_columns, parse_number};
pub use filter::{filter_noise_rows, guess_key_column};
pub use header::{HeaderPlan, flatten_two_row, locate_header};
pub use pipeline::{TableSource, ingest, ingest_path};
pub use sampler::{RawGrid, read_full_grid, sample_grid};
