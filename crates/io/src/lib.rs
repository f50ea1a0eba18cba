//! # demeter-io
//!
//! Read meteorological drivers and remote-sensing observations from NetCDF
//! files, write the ensemble forecast tensor to Parquet, and dump the
//! assimilation diagnostics summary as JSON. Bridges external file formats
//! into Demeter's internal slice-based APIs.

mod error;
mod netcdf_read;
mod parquet_write;
mod reader;
mod summary;
mod writer;

pub use error::IoError;
pub use reader::{DriverReaderConfig, ObsReaderConfig, read_drivers, read_observations};
pub use summary::{AnalysisEntry, AssimilationSummary, PoolQuantiles, summarize, write_summary};
pub use writer::{Compression, WriterConfig, write_parquet};
