use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::sampler::VariantSampler;
use crate::core::io::traits::ExistingResults;
use crate::core::models::variant::Variant;
use crate::core::models::variant_set::VariantSet;
use itertools::Itertools;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Result of a subvariant expansion.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// Emitted variants, closure by closure, larger variants first within a closure.
    pub variants: Vec<Variant>,
    /// Closure members skipped because this run had already emitted them.
    pub duplicates: u64,
    /// Closure members skipped because the existing-results index knows them.
    pub known: u64,
    /// Number of distinct main variants whose closures were processed.
    pub main_variants: u64,
}

/// Every subset of `main`'s substitutions with at least `min_subs` members, in
/// descending size; subsets of equal size follow lexicographic combination order.
/// `main` itself comes first.
pub fn closure(main: &Variant, min_subs: usize) -> Vec<Variant> {
    let subs = main.substitutions();
    let min_subs = min_subs.max(1);
    let mut members = Vec::new();
    for size in (min_subs..=subs.len()).rev() {
        for picked in subs.iter().copied().combinations(size) {
            members.push(Variant::from_sorted(picked));
        }
    }
    members
}

/// Grows a list of at least `target` variants by drawing `max_subs`-substitution
/// main variants and appending each one's closure down to `min_subs`.
///
/// Closure members already emitted in this run, or present in `existing`, are
/// skipped and counted. Closures are appended whole, so the result may overshoot
/// `target`.
///
/// # Errors
///
/// * [`EngineError::Configuration`] unless `1 <= min_subs <= max_subs <= positions`.
/// * [`EngineError::Exhaustion`] when every possible main variant has been drawn, or
///   the sampler's consecutive-rejection cap is reached, before `target` is met.
#[instrument(level = "info", skip(sampler, existing, rng, reporter))]
pub fn expand<E, R>(
    sampler: &VariantSampler,
    target: u64,
    min_subs: usize,
    max_subs: usize,
    existing: &E,
    rng: &mut R,
    reporter: &ProgressReporter,
) -> Result<Expansion, EngineError>
where
    E: ExistingResults + ?Sized,
    R: Rng + ?Sized,
{
    if min_subs == 0 || min_subs > max_subs {
        return Err(EngineError::Configuration(format!(
            "substitution range must satisfy 1 <= min ({}) <= max ({})",
            min_subs, max_subs
        )));
    }
    if max_subs > sampler.mutable_positions() {
        return Err(EngineError::Configuration(format!(
            "max substitutions ({}) exceeds the {} mutable positions",
            max_subs,
            sampler.mutable_positions()
        )));
    }

    let main_space = sampler.space_size(max_subs);
    let cap = sampler.config().max_consecutive_rejections;

    let mut emitted = VariantSet::new();
    let mut drawn_mains: HashSet<Variant> = HashSet::new();
    let mut expansion = Expansion::default();
    let mut consecutive_rejections = 0usize;

    reporter.report(Progress::TaskStart {
        total_steps: target,
    });

    while (emitted.len() as u64) < target {
        if drawn_mains.len() as u64 >= main_space {
            return Err(exhausted(
                max_subs,
                target,
                emitted.len(),
                "every possible main variant has been drawn",
            ));
        }

        let main = sampler.draw_one(max_subs, rng)?;
        if drawn_mains.contains(&main) {
            consecutive_rejections += 1;
            if consecutive_rejections >= cap {
                return Err(exhausted(
                    max_subs,
                    target,
                    emitted.len(),
                    &format!("{} consecutive main variants were repeats", cap),
                ));
            }
            continue;
        }
        consecutive_rejections = 0;

        let before = emitted.len();
        for member in closure(&main, min_subs) {
            if emitted.contains(&member) {
                debug!(variant = %member, "Skipping subvariant already emitted in this run");
                expansion.duplicates += 1;
            } else if existing.contains(&member.key()) {
                debug!(variant = %member, "Skipping subvariant with an existing result");
                expansion.known += 1;
            } else {
                emitted.insert(member);
            }
        }
        drawn_mains.insert(main);
        expansion.main_variants += 1;

        let added = (emitted.len() - before) as u64;
        if added > 0 {
            reporter.report(Progress::TaskAdvance { steps: added });
        }
    }

    reporter.report(Progress::TaskFinish);
    if expansion.duplicates > 0 || expansion.known > 0 {
        reporter.message(format!(
            "Skipped {} repeated and {} already-computed subvariants",
            expansion.duplicates, expansion.known
        ));
    }
    info!(
        emitted = emitted.len(),
        main_variants = expansion.main_variants,
        duplicates = expansion.duplicates,
        known = expansion.known,
        "Subvariant expansion finished"
    );

    expansion.variants = emitted.into_vec();
    Ok(expansion)
}

fn exhausted(num_subs: usize, target: u64, found: usize, reason: &str) -> EngineError {
    EngineError::Exhaustion {
        num_subs,
        requested: target,
        found: found as u64,
        reason: reason.to_string(),
    }
}
