//! Integration test: tensor out to Parquet and back.

use std::fs::File;

use arrow::array::AsArray;
use arrow::datatypes::{Float64Type, UInt32Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use demeter_forecast::run_forecast;
use demeter_io::{Compression, WriterConfig, write_parquet};
use demeter_model::{
    Allocation, CarbonPools, Driver, DriverSeries, ModelConfig, OutputVar, ParamEnsemble,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn small_forecast() -> demeter_forecast::ForecastOutput {
    let n = 3;
    let params = ParamEnsemble::from_fields(
        vec![5.0; n],
        vec![0.02; n],
        vec![2.0; n],
        vec![0.2; n],
        vec![0.001; n],
        vec![0.0002; n],
        vec![0.0; n],
        vec![0.0; n],
        vec![0.0; n],
        vec![Allocation::new(0.5, 0.3, 0.2); n],
    )
    .unwrap();
    let initial = vec![CarbonPools::new(5.0, 100.0, 80.0); n];
    let drivers = DriverSeries::shared(vec![Driver::new(12.0, 600.0); 4]);
    let mut rng = StdRng::seed_from_u64(1);
    run_forecast(&initial, &params, &drivers, &ModelConfig::new(), &mut rng).unwrap()
}

#[test]
fn tensor_written_and_read_back() {
    let output = small_forecast();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ensemble.parquet");

    // Small row groups force multiple batches.
    let config = WriterConfig::default()
        .with_compression(Compression::Snappy)
        .with_row_group_size(3);
    write_parquet(&path, &output, &config).unwrap();

    let file = File::open(&path).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();

    let mut n_rows = 0;
    let mut checked = false;
    for batch in reader {
        let batch = batch.unwrap();
        let steps = batch.column(0).as_primitive::<UInt32Type>();
        let particles = batch.column(1).as_primitive::<UInt32Type>();
        let soil_idx = 2 + OutputVar::SoilCarbon.index();
        let soil = batch.column(soil_idx).as_primitive::<Float64Type>();

        for row in 0..batch.num_rows() {
            let t = steps.value(row) as usize;
            let i = particles.value(row) as usize;
            assert_eq!(soil.value(row), output.value(t, i, OutputVar::SoilCarbon));
            checked = true;
        }
        n_rows += batch.num_rows();
    }

    assert!(checked);
    assert_eq!(n_rows, output.n_steps() * output.n_particles());
}

#[test]
fn uncompressed_write_succeeds() {
    let output = small_forecast();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.parquet");
    let config = WriterConfig::default().with_compression(Compression::None);
    write_parquet(&path, &output, &config).unwrap();
    assert!(path.metadata().unwrap().len() > 0);
}
