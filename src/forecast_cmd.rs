//! The `forecast` subcommand: open-loop ensemble forecast.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use demeter_forecast::run_forecast;
use demeter_io::{read_drivers, write_parquet};
use demeter_model::DriverSeries;
use demeter_priors::{draw_initial_state, draw_parameters};

use crate::cli::ForecastArgs;
use crate::config::DemeterConfig;
use crate::convert;

pub fn run(args: ForecastArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config: {}", args.config.display()))?;
    let mut config: DemeterConfig =
        toml::from_str(&raw).with_context(|| format!("invalid config: {}", args.config.display()))?;

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(output) = args.output {
        config.io.output = Some(output);
    }

    let drivers_path = config.io.drivers.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no drivers path: set [io].drivers in config")
    })?;
    let output_path = config.io.output.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no output path: set [io].output in config or use --output")
    })?;

    let model_config = convert::build_model_config(&config.model)?;
    let reader_config = convert::build_driver_reader_config(&config.io);
    let writer_config = convert::build_writer_config(&config.io)?;
    let priors = convert::build_priors(&config.priors);

    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    info!(path = %drivers_path.display(), "reading drivers");
    let drivers = DriverSeries::shared(
        read_drivers(drivers_path, &reader_config)
            .with_context(|| format!("failed to read drivers: {}", drivers_path.display()))?,
    );

    let n = config.ensemble.n_particles;
    info!(n_particles = n, "drawing prior ensemble");
    let params = draw_parameters(&priors, n, &mut rng).context("failed to draw parameters")?;
    let initial = draw_initial_state(&priors, n, &mut rng).context("failed to draw initial state")?;

    info!(n_steps = drivers.n_steps(), "running open-loop forecast");
    let output = run_forecast(&initial, &params, &drivers, &model_config, &mut rng)
        .context("forecast failed")?;

    write_parquet(output_path, &output, &writer_config)
        .with_context(|| format!("failed to write output: {}", output_path.display()))?;
    info!(path = %output_path.display(), "forecast complete");
    Ok(())
}
