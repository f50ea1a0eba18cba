//! The `assimilate` subcommand: the particle-filter loop.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use demeter_filter::{Ensemble, ObservationSeries, run_assimilation};
use demeter_io::{read_drivers, read_observations, summarize, write_parquet, write_summary};
use demeter_model::DriverSeries;
use demeter_priors::{draw_initial_state, draw_parameters};

use crate::cli::AssimilateArgs;
use crate::config::DemeterConfig;
use crate::convert;

pub fn run(args: AssimilateArgs) -> Result<()> {
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
    if let Some(summary) = args.summary {
        config.io.summary = Some(summary);
    }

    let drivers_path = config.io.drivers.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no drivers path: set [io].drivers in config")
    })?;
    let obs_path = config.io.observations.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no observations path: set [io].observations in config")
    })?;
    let output_path = config.io.output.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no output path: set [io].output in config or use --output")
    })?;

    let model_config = convert::build_model_config(&config.model)?;
    let filter_config = convert::build_filter_config(&config.filter, args.no_resample)?;
    let driver_reader = convert::build_driver_reader_config(&config.io);
    let obs_reader = convert::build_obs_reader_config(&config.io);
    let writer_config = convert::build_writer_config(&config.io)?;
    let priors = convert::build_priors(&config.priors);

    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    info!(path = %drivers_path.display(), "reading drivers");
    let drivers = DriverSeries::shared(
        read_drivers(drivers_path, &driver_reader)
            .with_context(|| format!("failed to read drivers: {}", drivers_path.display()))?,
    );

    info!(path = %obs_path.display(), "reading observations");
    let slots = read_observations(obs_path, &obs_reader)
        .with_context(|| format!("failed to read observations: {}", obs_path.display()))?;
    let observations = ObservationSeries::new(slots, config.filter.cadence)
        .context("invalid observation series")?;

    let n = config.ensemble.n_particles;
    info!(n_particles = n, "drawing prior ensemble");
    let params = draw_parameters(&priors, n, &mut rng).context("failed to draw parameters")?;
    let initial = draw_initial_state(&priors, n, &mut rng).context("failed to draw initial state")?;
    let ensemble =
        Ensemble::with_uniform_weights(initial, params).context("failed to build ensemble")?;

    let result = run_assimilation(
        ensemble,
        &drivers,
        &observations,
        &model_config,
        &filter_config,
        &mut rng,
    )
    .context("assimilation failed")?;

    write_parquet(output_path, result.output(), &writer_config)
        .with_context(|| format!("failed to write output: {}", output_path.display()))?;

    if let Some(summary_path) = config.io.summary.as_ref() {
        let summary = summarize(&result, config.filter.cadence, filter_config.observed());
        write_summary(summary_path, &summary)
            .with_context(|| format!("failed to write summary: {}", summary_path.display()))?;
        info!(path = %summary_path.display(), "summary written");
    }

    info!(
        n_analyses = result.records().len(),
        n_resamples = result.history().n_resamples(),
        "assimilation complete"
    );
    Ok(())
}
