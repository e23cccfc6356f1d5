use crate::error::{CliError, Result};
use mutscan::core::models::sequence::Alphabet;
use mutscan::engine::config::{
    self as core_config, GenerationConfigBuilder, PartitionConfigBuilder,
};
use mutscan::engine::runtime::{
    DEFAULT_INTERCEPT_SECS, DEFAULT_SLOPE_SECS_PER_RESIDUE, RuntimeEstimator,
};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Values used when neither the command line nor the config file sets a parameter.
pub struct Defaults {
    pub density_threshold: f64,
    pub max_consecutive_rejections: usize,
    pub runtime_slope: f64,
    pub runtime_intercept: f64,
    pub hours_per_job: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            density_threshold: core_config::DEFAULT_DENSITY_THRESHOLD,
            max_consecutive_rejections: core_config::DEFAULT_MAX_CONSECUTIVE_REJECTIONS,
            runtime_slope: DEFAULT_SLOPE_SECS_PER_RESIDUE,
            runtime_intercept: DEFAULT_INTERCEPT_SECS,
            hours_per_job: core_config::DEFAULT_SECONDS_PER_JOB / SECONDS_PER_HOUR,
        }
    }
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialGenerationConfig {
    alphabet: Option<String>,
    density_threshold: Option<f64>,
    max_consecutive_rejections: Option<usize>,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialPartitionConfig {
    runtime_slope: Option<f64>,
    runtime_intercept: Option<f64>,
    hours_per_job: Option<f64>,
}

/// Settings read from the optional TOML file, before CLI overrides and defaults.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    generation: Option<PartialGenerationConfig>,
    partition: Option<PartialPartitionConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `path` when given, applies `-S` overrides, and returns the result.
    pub fn load(path: Option<&Path>, set_values: &[String]) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_set_values(set_values)?;
        Ok(config)
    }

    pub fn into_generation_config(
        self,
        cli_alphabet: Option<&str>,
    ) -> Result<core_config::GenerationConfig> {
        let defaults = Defaults::default();
        let file = self.generation.unwrap_or_default();

        let alphabet = match cli_alphabet.or(file.alphabet.as_deref()) {
            Some(residues) => Alphabet::new(residues)
                .map_err(|e| CliError::Config(format!("Invalid alphabet '{}': {}", residues, e)))?,
            None => Alphabet::standard_amino_acids(),
        };

        GenerationConfigBuilder::new()
            .alphabet(alphabet)
            .density_threshold(file.density_threshold.unwrap_or(defaults.density_threshold))
            .max_consecutive_rejections(
                file.max_consecutive_rejections
                    .unwrap_or(defaults.max_consecutive_rejections),
            )
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// A fixed job size wins; otherwise jobs are balanced by estimated runtime.
    pub fn into_partition_config(
        self,
        variants_per_job: Option<usize>,
        cli_hours_per_job: Option<f64>,
    ) -> Result<core_config::PartitionConfig> {
        let defaults = Defaults::default();
        let file = self.partition.unwrap_or_default();

        let mut builder = PartitionConfigBuilder::new();
        if let Some(n) = variants_per_job {
            builder = builder.variants_per_job(n);
        }
        let estimator = RuntimeEstimator::new(
            file.runtime_slope.unwrap_or(defaults.runtime_slope),
            file.runtime_intercept.unwrap_or(defaults.runtime_intercept),
        );
        let hours = cli_hours_per_job
            .or(file.hours_per_job)
            .unwrap_or(defaults.hours_per_job);

        builder
            .estimator(estimator)
            .seconds_per_job(hours * SECONDS_PER_HOUR)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "generation.alphabet" => {
                    self.generation
                        .get_or_insert_with(Default::default)
                        .alphabet = Some(value.to_string());
                }
                "generation.density-threshold" => {
                    self.generation
                        .get_or_insert_with(Default::default)
                        .density_threshold = Some(parse_value(key, value)?);
                }
                "generation.max-consecutive-rejections" => {
                    self.generation
                        .get_or_insert_with(Default::default)
                        .max_consecutive_rejections = Some(parse_value(key, value)?);
                }
                "partition.runtime-slope" => {
                    self.partition
                        .get_or_insert_with(Default::default)
                        .runtime_slope = Some(parse_value(key, value)?);
                }
                "partition.runtime-intercept" => {
                    self.partition
                        .get_or_insert_with(Default::default)
                        .runtime_intercept = Some(parse_value(key, value)?);
                }
                "partition.hours-per-job" => {
                    self.partition
                        .get_or_insert_with(Default::default)
                        .hours_per_job = Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}
