//! High-level Parquet writer configuration and orchestration.

use std::path::Path;

use parquet::file::properties::WriterProperties;
use tracing::info;

use demeter_forecast::ForecastOutput;

use crate::error::IoError;
use crate::parquet_write;

/// Compression algorithm for Parquet output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// No compression.
    None,
    /// Snappy compression (fast, moderate ratio).
    #[default]
    Snappy,
    /// Zstd compression (slower, better ratio).
    Zstd,
}

impl Compression {
    /// Converts to the corresponding `parquet::basic::Compression` variant.
    fn to_parquet(self) -> Result<parquet::basic::Compression, IoError> {
        Ok(match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
            Self::Zstd => {
                let level =
                    parquet::basic::ZstdLevel::try_new(3).map_err(|e| IoError::Parquet {
                        reason: e.to_string(),
                    })?;
                parquet::basic::Compression::ZSTD(level)
            }
        })
    }
}

/// Configuration for writing the forecast tensor to Parquet.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression algorithm to use.
    compression: Compression,
    /// Maximum number of rows per row group.
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 1_000_000,
        }
    }
}

impl WriterConfig {
    /// Sets the compression algorithm.
    pub fn with_compression(mut self, comp: Compression) -> Self {
        self.compression = comp;
        self
    }

    /// Sets the maximum number of rows per row group.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `row_group_size` is zero.
    fn validate(&self) -> Result<(), IoError> {
        if self.row_group_size == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "row_group_size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Writes the forecast tensor to a long-format Parquet file: one row per
/// (step, particle) with every output variable as a column.
///
/// Batches are cut on step boundaries sized to roughly fill a row group.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the configuration is invalid, or
/// [`IoError::Parquet`] on schema construction, batch conversion, or file
/// I/O failure.
pub fn write_parquet(
    path: &Path,
    output: &ForecastOutput,
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;

    let schema = parquet_write::build_schema();
    let compression = config.compression.to_parquet()?;
    let props = WriterProperties::builder()
        .set_compression(compression)
        .set_max_row_group_size(config.row_group_size)
        .build();

    let n = output.n_particles().max(1);
    let steps_per_batch = (config.row_group_size / n).max(1);

    let mut batches = Vec::new();
    let mut start = 0;
    while start < output.n_steps() {
        let end = (start + steps_per_batch).min(output.n_steps());
        batches.push(parquet_write::tensor_to_record_batch(
            output, start, end, &schema,
        )?);
        start = end;
    }

    parquet_write::write_batches(path, &batches, &schema, props)?;
    info!(
        path = %path.display(),
        n_steps = output.n_steps(),
        n_particles = output.n_particles(),
        "forecast tensor written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = WriterConfig::default();
        assert_eq!(config.compression, Compression::Snappy);
        assert_eq!(config.row_group_size, 1_000_000);
    }

    #[test]
    fn zero_row_group_rejected() {
        let config = WriterConfig::default().with_row_group_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn compression_conversion() {
        assert!(Compression::None.to_parquet().is_ok());
        assert!(Compression::Snappy.to_parquet().is_ok());
        assert!(Compression::Zstd.to_parquet().is_ok());
    }
}
