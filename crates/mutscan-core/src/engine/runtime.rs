pub const DEFAULT_SLOPE_SECS_PER_RESIDUE: f64 = 0.66;
pub const DEFAULT_INTERCEPT_SECS: f64 = 42.0;

/// Linear model of per-variant compute time (seconds) as a function of sequence length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeEstimator {
    pub slope: f64,
    pub intercept: f64,
}

impl RuntimeEstimator {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    #[inline]
    pub fn estimate(&self, sequence_length: usize) -> f64 {
        self.slope * sequence_length as f64 + self.intercept
    }
}

impl Default for RuntimeEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_SLOPE_SECS_PER_RESIDUE, DEFAULT_INTERCEPT_SECS)
    }
}
