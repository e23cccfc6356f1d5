use super::config::SamplingConfig;
use super::enumerator::{ResidueChoices, VariantSpace};
use super::error::EngineError;
use crate::core::models::sequence::{Alphabet, MutablePositions, Sequence};
use crate::core::models::variant::Variant;
use crate::core::models::variant_set::VariantSet;
use rand::Rng;
use rand::seq::{SliceRandom, index};
use tracing::{debug, instrument};

/// How a sample of a given size is drawn from a variant space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// The request covers the whole space: emit the full enumeration.
    Exhaustive,
    /// Dense request: materialize the space, then draw indices without replacement.
    EnumerateThenSample,
    /// Sparse request: draw random variants and reject repeats.
    Rejection,
}

/// Seeded sampling without replacement over the variants of one reference sequence.
#[derive(Debug, Clone)]
pub struct VariantSampler {
    choices: ResidueChoices,
    config: SamplingConfig,
}

impl VariantSampler {
    pub fn new(
        sequence: &Sequence,
        alphabet: &Alphabet,
        positions: &MutablePositions,
        config: SamplingConfig,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            choices: ResidueChoices::new(sequence, alphabet, positions)?,
            config,
        })
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Number of positions that admit at least one replacement residue.
    pub fn mutable_positions(&self) -> usize {
        self.choices.len()
    }

    /// The space this sampler draws `num_subs`-substitution variants from.
    pub fn space(&self, num_subs: usize) -> Result<VariantSpace, EngineError> {
        check_num_subs(num_subs)?;
        Ok(VariantSpace::from_choices(self.choices.clone(), num_subs))
    }

    pub fn space_size(&self, num_subs: usize) -> u64 {
        self.choices.space_size(num_subs)
    }

    pub fn strategy_for(&self, num_subs: usize, count: u64) -> SamplingStrategy {
        let max = self.space_size(num_subs);
        if count >= max {
            SamplingStrategy::Exhaustive
        } else if count as f64 / max as f64 > self.config.density_threshold {
            SamplingStrategy::EnumerateThenSample
        } else {
            SamplingStrategy::Rejection
        }
    }

    /// Draws a single random variant: `num_subs` distinct positions chosen uniformly,
    /// then one replacement residue per position chosen uniformly from the alphabet
    /// minus the reference residue.
    pub fn draw_one<R: Rng + ?Sized>(
        &self,
        num_subs: usize,
        rng: &mut R,
    ) -> Result<Variant, EngineError> {
        check_num_subs(num_subs)?;
        if num_subs > self.choices.len() {
            return Err(EngineError::Exhaustion {
                num_subs,
                requested: 1,
                found: 0,
                reason: format!("only {} positions are mutable", self.choices.len()),
            });
        }

        let mut slots = index::sample(rng, self.choices.len(), num_subs).into_vec();
        slots.sort_unstable();

        let mut residues = Vec::with_capacity(num_subs);
        for &slot in &slots {
            let residue = self.choices.replacements(slot).choose(rng).ok_or_else(|| {
                EngineError::Configuration(
                    "alphabet offers no replacement for a mutable position".to_string(),
                )
            })?;
            residues.push(*residue);
        }
        Ok(self.choices.variant(&slots, &residues))
    }

    /// Returns `count` distinct variants with `num_subs` substitutions each.
    ///
    /// # Errors
    ///
    /// * [`EngineError::Configuration`] if `num_subs` is zero.
    /// * [`EngineError::Exhaustion`] if `count` exceeds the size of the space, or if
    ///   rejection sampling hits the configured run of consecutive duplicates.
    #[instrument(level = "debug", skip(self, rng))]
    pub fn sample<R: Rng + ?Sized>(
        &self,
        num_subs: usize,
        count: u64,
        rng: &mut R,
    ) -> Result<Vec<Variant>, EngineError> {
        check_num_subs(num_subs)?;
        let max = self.space_size(num_subs);
        if count > max {
            return Err(EngineError::Exhaustion {
                num_subs,
                requested: count,
                found: max,
                reason: "the request exceeds the number of possible variants".to_string(),
            });
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let strategy = self.strategy_for(num_subs, count);
        debug!(
            num_subs,
            count,
            max,
            ?strategy,
            "Selected sampling strategy"
        );
        match strategy {
            SamplingStrategy::Exhaustive => Ok(self.space(num_subs)?.iter().collect()),
            SamplingStrategy::EnumerateThenSample => {
                let all: Vec<Variant> = self.space(num_subs)?.iter().collect();
                let picks = index::sample(rng, all.len(), count as usize);
                Ok(picks.into_iter().map(|i| all[i].clone()).collect())
            }
            SamplingStrategy::Rejection => self.sample_by_rejection(num_subs, count, rng),
        }
    }

    fn sample_by_rejection<R: Rng + ?Sized>(
        &self,
        num_subs: usize,
        count: u64,
        rng: &mut R,
    ) -> Result<Vec<Variant>, EngineError> {
        let mut accepted = VariantSet::with_capacity(count as usize);
        let mut consecutive_rejections = 0usize;
        let mut total_rejections = 0usize;

        while (accepted.len() as u64) < count {
            let variant = self.draw_one(num_subs, rng)?;
            if accepted.insert(variant) {
                consecutive_rejections = 0;
                continue;
            }
            consecutive_rejections += 1;
            total_rejections += 1;
            if consecutive_rejections >= self.config.max_consecutive_rejections {
                return Err(EngineError::Exhaustion {
                    num_subs,
                    requested: count,
                    found: accepted.len() as u64,
                    reason: format!(
                        "{} consecutive draws were duplicates; lower the density threshold",
                        consecutive_rejections
                    ),
                });
            }
        }

        debug!(num_subs, total_rejections, "Rejection sampling finished");
        Ok(accepted.into_vec())
    }
}

fn check_num_subs(num_subs: usize) -> Result<(), EngineError> {
    if num_subs == 0 {
        return Err(EngineError::Configuration(
            "number of substitutions must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Samples `count` distinct variants of `sequence` in one call; see
/// [`VariantSampler::sample`].
pub fn sample<R: Rng + ?Sized>(
    sequence: &Sequence,
    num_subs: usize,
    count: u64,
    alphabet: &Alphabet,
    positions: &MutablePositions,
    config: &SamplingConfig,
    rng: &mut R,
) -> Result<Vec<Variant>, EngineError> {
    VariantSampler::new(sequence, alphabet, positions, config.clone())?.sample(num_subs, count, rng)
}
