//! Low-level Parquet column building for the forecast tensor.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use demeter_forecast::ForecastOutput;
use demeter_model::OutputVar;

use crate::error::IoError;

/// Builds the Arrow schema for the long-format tensor: `step`, `particle`,
/// then one Float64 column per output variable in tensor order.
pub(crate) fn build_schema() -> Schema {
    let mut fields = vec![
        Field::new("step", DataType::UInt32, false),
        Field::new("particle", DataType::UInt32, false),
    ];
    for var in OutputVar::ALL {
        fields.push(Field::new(var.name(), DataType::Float64, false));
    }
    Schema::new(fields)
}

/// Converts the steps `[start, end)` of the tensor into one Arrow
/// [`RecordBatch`] with `(end - start) * n_particles` rows.
pub(crate) fn tensor_to_record_batch(
    output: &ForecastOutput,
    start: usize,
    end: usize,
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let n = output.n_particles();
    let n_rows = (end - start) * n;

    let mut steps = Vec::with_capacity(n_rows);
    let mut particles = Vec::with_capacity(n_rows);
    for t in start..end {
        for i in 0..n {
            steps.push(t as u32);
            particles.push(i as u32);
        }
    }

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(steps)),
        Arc::new(UInt32Array::from(particles)),
    ];
    for var in OutputVar::ALL {
        let mut col = Vec::with_capacity(n_rows);
        for t in start..end {
            for i in 0..n {
                col.push(output.value(t, i, var));
            }
        }
        columns.push(Arc::new(Float64Array::from(col)));
    }

    RecordBatch::try_new(Arc::new(schema.clone()), columns).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })
}

/// Writes a sequence of [`RecordBatch`]es to a Parquet file at `path`.
///
/// # Errors
///
/// Returns [`IoError::Parquet`] if file creation, batch writing, or file
/// finalization fails.
pub(crate) fn write_batches(
    path: &Path,
    batches: &[RecordBatch],
    schema: &Schema,
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })?;
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

    for batch in batches {
        writer.write(batch)?;
    }

    writer.close()?;
    Ok(())
}
