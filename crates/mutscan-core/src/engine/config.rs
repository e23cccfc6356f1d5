use super::runtime::RuntimeEstimator;
use crate::core::models::sequence::Alphabet;
use thiserror::Error;

pub const DEFAULT_DENSITY_THRESHOLD: f64 = 0.4;
pub const DEFAULT_MAX_CONSECUTIVE_REJECTIONS: usize = 100_000;
pub const DEFAULT_SECONDS_PER_JOB: f64 = 5.0 * 60.0 * 60.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

/// Tuning for the variant sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Above this fraction of the space size, the sampler materializes the full
    /// enumeration and draws from it instead of rejection sampling.
    pub density_threshold: f64,
    /// Consecutive duplicate draws tolerated before giving up with an exhaustion error.
    pub max_consecutive_rejections: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            density_threshold: DEFAULT_DENSITY_THRESHOLD,
            max_consecutive_rejections: DEFAULT_MAX_CONSECUTIVE_REJECTIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub alphabet: Alphabet,
    pub sampling: SamplingConfig,
}

#[derive(Default)]
pub struct GenerationConfigBuilder {
    alphabet: Option<Alphabet>,
    density_threshold: Option<f64>,
    max_consecutive_rejections: Option<usize>,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = Some(alphabet);
        self
    }
    pub fn density_threshold(mut self, threshold: f64) -> Self {
        self.density_threshold = Some(threshold);
        self
    }
    pub fn max_consecutive_rejections(mut self, cap: usize) -> Self {
        self.max_consecutive_rejections = Some(cap);
        self
    }

    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        let density_threshold = self
            .density_threshold
            .ok_or(ConfigError::MissingParameter("density_threshold"))?;
        if !(density_threshold > 0.0 && density_threshold <= 1.0) {
            return Err(ConfigError::Invalid {
                parameter: "density_threshold",
                reason: format!("{} is not within (0, 1]", density_threshold),
            });
        }
        let max_consecutive_rejections = self
            .max_consecutive_rejections
            .ok_or(ConfigError::MissingParameter("max_consecutive_rejections"))?;
        if max_consecutive_rejections == 0 {
            return Err(ConfigError::Invalid {
                parameter: "max_consecutive_rejections",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(GenerationConfig {
            alphabet: self
                .alphabet
                .ok_or(ConfigError::MissingParameter("alphabet"))?,
            sampling: SamplingConfig {
                density_threshold,
                max_consecutive_rejections,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionConfig {
    /// Consecutive chunks of exactly `variants_per_job` descriptors.
    FixedSize { variants_per_job: usize },
    /// Jobs sized so each carries roughly `seconds_per_job` of estimated runtime.
    CostBalanced {
        estimator: RuntimeEstimator,
        seconds_per_job: f64,
    },
}

#[derive(Default)]
pub struct PartitionConfigBuilder {
    variants_per_job: Option<usize>,
    estimator: Option<RuntimeEstimator>,
    seconds_per_job: Option<f64>,
}

impl PartitionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variants_per_job(mut self, n: usize) -> Self {
        self.variants_per_job = Some(n);
        self
    }
    pub fn estimator(mut self, estimator: RuntimeEstimator) -> Self {
        self.estimator = Some(estimator);
        self
    }
    pub fn seconds_per_job(mut self, seconds: f64) -> Self {
        self.seconds_per_job = Some(seconds);
        self
    }

    /// A fixed job size takes precedence; otherwise both cost-balancing parameters
    /// are required.
    pub fn build(self) -> Result<PartitionConfig, ConfigError> {
        if let Some(variants_per_job) = self.variants_per_job {
            if variants_per_job == 0 {
                return Err(ConfigError::Invalid {
                    parameter: "variants_per_job",
                    reason: "must be at least 1".to_string(),
                });
            }
            return Ok(PartitionConfig::FixedSize { variants_per_job });
        }

        let estimator = self
            .estimator
            .ok_or(ConfigError::MissingParameter("estimator"))?;
        let seconds_per_job = self
            .seconds_per_job
            .ok_or(ConfigError::MissingParameter("seconds_per_job"))?;
        if !(seconds_per_job.is_finite() && seconds_per_job > 0.0) {
            return Err(ConfigError::Invalid {
                parameter: "seconds_per_job",
                reason: format!("{} is not a positive duration", seconds_per_job),
            });
        }
        Ok(PartitionConfig::CostBalanced {
            estimator,
            seconds_per_job,
        })
    }
}
