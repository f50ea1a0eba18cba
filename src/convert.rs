//! Bridges TOML configuration into crate-level configs.

use anyhow::{Context, Result, bail};

use demeter_filter::FilterConfig;
use demeter_io::{Compression, DriverReaderConfig, ObsReaderConfig, WriterConfig};
use demeter_model::{ModelConfig, OutputVar};
use demeter_priors::{AllocationPrior, ParameterPriors, PriorSpec};

use crate::config::{FilterToml, IoToml, ModelToml, PriorToml, PriorsToml};

pub fn build_model_config(toml: &ModelToml) -> Result<ModelConfig> {
    let config = ModelConfig::new()
        .with_timestep_secs(toml.timestep_secs)
        .with_night_par_threshold(toml.night_par_threshold);
    config.validate().context("invalid [model] section")?;
    Ok(config)
}

pub fn build_filter_config(toml: &FilterToml, resample_override: bool) -> Result<FilterConfig> {
    let observed: OutputVar = toml
        .observed
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid [filter].observed")?;
    let config = FilterConfig::new()
        .with_observed(observed)
        .with_ess_fraction(toml.ess_fraction)
        .with_smoothing(toml.smoothing)
        .with_resample(toml.resample && !resample_override);
    config.validate().context("invalid [filter] section")?;
    Ok(config)
}

pub fn build_driver_reader_config(toml: &IoToml) -> DriverReaderConfig {
    DriverReaderConfig::new()
        .with_temp_var(toml.temp_var.clone())
        .with_par_var(toml.par_var.clone())
}

pub fn build_obs_reader_config(toml: &IoToml) -> ObsReaderConfig {
    ObsReaderConfig::new()
        .with_value_var(toml.obs_var.clone())
        .with_sd_var(toml.obs_sd_var.clone())
}

pub fn build_writer_config(toml: &IoToml) -> Result<WriterConfig> {
    let compression = match toml.compression.as_str() {
        "none" => Compression::None,
        "snappy" => Compression::Snappy,
        "zstd" => Compression::Zstd,
        other => bail!("unknown compression '{other}' (expected none, snappy, or zstd)"),
    };
    Ok(WriterConfig::default()
        .with_compression(compression)
        .with_row_group_size(toml.row_group_size))
}

fn convert_prior(toml: &PriorToml) -> PriorSpec {
    match *toml {
        PriorToml::Fixed { value } => PriorSpec::Fixed { value },
        PriorToml::Uniform { lo, hi } => PriorSpec::Uniform { lo, hi },
        PriorToml::Normal { mean, sd } => PriorSpec::Normal { mean, sd },
        PriorToml::Lognormal { location, scale } => PriorSpec::LogNormal { location, scale },
        PriorToml::Beta { alpha, beta } => PriorSpec::Beta { alpha, beta },
    }
}

/// Builds the prior bundle, starting from the reference elicitation and
/// applying each TOML override.
pub fn build_priors(toml: &PriorsToml) -> ParameterPriors {
    let mut priors = ParameterPriors::reference();
    let fields = [
        (&toml.sla, &mut priors.sla),
        (&toml.lue, &mut priors.lue),
        (&toml.q10, &mut priors.q10),
        (&toml.r_basal, &mut priors.r_basal),
        (&toml.litterfall, &mut priors.litterfall),
        (&toml.mortality, &mut priors.mortality),
        (&toml.sigma_leaf, &mut priors.sigma_leaf),
        (&toml.sigma_wood, &mut priors.sigma_wood),
        (&toml.sigma_soil, &mut priors.sigma_soil),
        (&toml.initial_leaf, &mut priors.initial_leaf),
        (&toml.initial_wood, &mut priors.initial_wood),
        (&toml.initial_soil, &mut priors.initial_soil),
    ];
    for (source, target) in fields {
        if let Some(spec) = source {
            *target = convert_prior(spec);
        }
    }
    if let Some(concentration) = toml.alloc {
        priors.alloc = AllocationPrior::new(concentration);
    }
    priors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_config_from_toml() {
        let toml = ModelToml {
            timestep_secs: 3600.0,
            night_par_threshold: 1e-20,
        };
        let config = build_model_config(&toml).unwrap();
        assert_eq!(config.timestep_secs(), 3600.0);
    }

    #[test]
    fn model_config_rejects_bad_timestep() {
        let toml = ModelToml {
            timestep_secs: -1.0,
            night_par_threshold: 1e-20,
        };
        assert!(build_model_config(&toml).is_err());
    }

    #[test]
    fn filter_config_parses_observed() {
        let toml = FilterToml {
            observed: "nep".to_string(),
            ..Default::default()
        };
        let config = build_filter_config(&toml, false).unwrap();
        assert_eq!(config.observed(), OutputVar::Nep);
    }

    #[test]
    fn filter_config_rejects_unknown_variable() {
        let toml = FilterToml {
            observed: "biomass".to_string(),
            ..Default::default()
        };
        assert!(build_filter_config(&toml, false).is_err());
    }

    #[test]
    fn resample_override_wins() {
        let toml = FilterToml::default();
        assert!(build_filter_config(&toml, false).unwrap().resample());
        assert!(!build_filter_config(&toml, true).unwrap().resample());
    }

    #[test]
    fn writer_config_rejects_unknown_compression() {
        let toml = IoToml {
            compression: "brotli".to_string(),
            ..Default::default()
        };
        assert!(build_writer_config(&toml).is_err());
    }

    #[test]
    fn priors_override_applies() {
        let toml = PriorsToml {
            q10: Some(PriorToml::Fixed { value: 2.0 }),
            alloc: Some([3.0, 3.0, 3.0]),
            ..Default::default()
        };
        let priors = build_priors(&toml);
        assert_eq!(priors.q10, PriorSpec::Fixed { value: 2.0 });
        assert_eq!(priors.alloc.concentration, [3.0, 3.0, 3.0]);
        // Untouched fields keep the reference elicitation.
        assert_eq!(priors.sla, ParameterPriors::reference().sla);
    }
}
