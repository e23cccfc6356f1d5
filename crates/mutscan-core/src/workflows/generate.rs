use crate::core::io::results::ResultsIndex;
use crate::core::io::traits::{ExistingResults, NoExistingResults};
use crate::core::io::variant_list::{VariantListError, VariantListFile};
use crate::core::models::descriptor::{VariantDescriptor, structure_stem};
use crate::core::models::sequence::{MutablePositions, Sequence};
use crate::core::models::variant::Variant;
use crate::core::utils::format::human_format;
use crate::engine::allocation::allocate;
use crate::engine::config::GenerationConfig;
use crate::engine::enumerator::generate_all;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::sampler::VariantSampler;
use crate::engine::subvariants::expand;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Range that generated seeds are drawn from, so they always print with nine digits.
pub const SEED_RANGE: std::ops::RangeInclusive<u64> = 100_000_000..=999_999_999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMethod {
    /// Every variant for each listed substitution count, concatenated in list order.
    All { num_subs: Vec<usize> },
    /// `target` distinct variants split across the listed substitution counts, the whole
    /// list then repeated `replicates` times.
    Random {
        target: u64,
        num_subs: Vec<usize>,
        replicates: usize,
    },
    /// Closures of `max_subs` main variants down to `min_subs`, skipping known results.
    Subvariants {
        target: u64,
        min_subs: usize,
        max_subs: usize,
    },
}

impl GenerationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::All { .. } => "all",
            Self::Random { .. } => "random",
            Self::Subvariants { .. } => "subvariants",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Written as the first field of every descriptor; its stem prefixes the file name.
    pub structure_id: String,
    pub sequence: Sequence,
    pub positions: MutablePositions,
    pub method: GenerationMethod,
    pub seed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Emitted descriptors per substitution count, replicates included.
    pub counts_by_size: BTreeMap<usize, u64>,
    pub duplicates: u64,
    pub known: u64,
}

#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub file_name: String,
    pub descriptors: Vec<VariantDescriptor>,
    pub summary: GenerationSummary,
}

/// Returns `seed`, or a fresh one from [`SEED_RANGE`] when none was given.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed = rand::thread_rng().gen_range(SEED_RANGE);
            info!(seed, "No seed given; generated one");
            seed
        }
    }
}

/// File name of a master list, encoding the method and its parameters.
pub fn output_file_name(
    structure_id: &str,
    method: &GenerationMethod,
    seed: u64,
    db_fingerprint: &str,
) -> String {
    let stem = structure_stem(structure_id);
    match method {
        GenerationMethod::All { num_subs } => {
            format!("{}_all_NS-{}.txt", stem, num_subs.iter().join(","))
        }
        GenerationMethod::Random {
            target,
            num_subs,
            replicates,
        } => format!(
            "{}_random_TN-{}_NR-{}_NS-{}_RS-{}.txt",
            stem,
            human_format(*target),
            replicates,
            num_subs.iter().join(","),
            seed
        ),
        GenerationMethod::Subvariants {
            target,
            min_subs,
            max_subs,
        } => format!(
            "{}_subvariants_TN-{}_MAXS-{}_MINS-{}_DB-{}_RS-{}.txt",
            stem,
            human_format(*target),
            max_subs,
            min_subs,
            db_fingerprint,
            seed
        ),
    }
}

/// Generates the master list in memory without touching the filesystem.
#[instrument(
    skip_all,
    name = "generation_workflow",
    fields(method = request.method.name(), seed = request.seed)
)]
pub fn generate(
    request: &GenerationRequest,
    config: &GenerationConfig,
    existing: Option<&ResultsIndex>,
    reporter: &ProgressReporter,
) -> Result<GenerationOutput, EngineError> {
    let fingerprint = existing.map_or("0", ResultsIndex::fingerprint);
    let file_name = output_file_name(
        &request.structure_id,
        &request.method,
        request.seed,
        fingerprint,
    );

    reporter.phase(format!("Generating {} variants", request.method.name()));
    let mut rng = StdRng::seed_from_u64(request.seed);
    let mut summary = GenerationSummary::default();

    let variants = match &request.method {
        GenerationMethod::All { num_subs } => generate_every(request, config, num_subs, reporter)?,
        GenerationMethod::Random {
            target,
            num_subs,
            replicates,
        } => {
            let sampler = sampler_for(request, config)?;
            let once = generate_random(&sampler, *target, num_subs, &mut rng, reporter)?;
            replicate(once, *replicates)?
        }
        GenerationMethod::Subvariants {
            target,
            min_subs,
            max_subs,
        } => {
            let sampler = sampler_for(request, config)?;
            let fallback = NoExistingResults;
            let existing: &dyn ExistingResults = match existing {
                Some(index) => index,
                None => &fallback,
            };
            let expansion = expand(
                &sampler, *target, *min_subs, *max_subs, existing, &mut rng, reporter,
            )?;
            summary.duplicates = expansion.duplicates;
            summary.known = expansion.known;
            expansion.variants
        }
    };
    reporter.report(Progress::PhaseFinish);

    for variant in &variants {
        *summary.counts_by_size.entry(variant.len()).or_default() += 1;
    }
    for (size, count) in &summary.counts_by_size {
        info!(num_subs = size, count, "Generated variants");
    }

    let descriptors = variants
        .into_iter()
        .map(|variant| VariantDescriptor::new(request.structure_id.clone(), variant))
        .collect();
    Ok(GenerationOutput {
        file_name,
        descriptors,
        summary,
    })
}

/// Generates the master list and writes it to `out_dir`, which is created if needed.
///
/// # Errors
///
/// Returns [`EngineError::OutputConflict`] before generating anything if the output
/// file already exists.
pub fn run(
    request: &GenerationRequest,
    config: &GenerationConfig,
    existing: Option<&ResultsIndex>,
    out_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<(PathBuf, GenerationOutput), EngineError> {
    let fingerprint = existing.map_or("0", ResultsIndex::fingerprint);
    let path = out_dir.join(output_file_name(
        &request.structure_id,
        &request.method,
        request.seed,
        fingerprint,
    ));
    if path.exists() {
        return Err(EngineError::OutputConflict { path });
    }
    info!(path = %path.display(), "Output file will be written");

    let output = generate(request, config, existing, reporter)?;

    std::fs::create_dir_all(out_dir)?;
    VariantListFile::write_to_new_path(&output.descriptors, &path).map_err(|e| match e {
        VariantListError::Io(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            EngineError::OutputConflict { path: path.clone() }
        }
        other => other.into(),
    })?;
    info!(
        path = %path.display(),
        descriptors = output.descriptors.len(),
        "Wrote master variant list"
    );
    Ok((path, output))
}

fn sampler_for(
    request: &GenerationRequest,
    config: &GenerationConfig,
) -> Result<VariantSampler, EngineError> {
    VariantSampler::new(
        &request.sequence,
        &config.alphabet,
        &request.positions,
        config.sampling.clone(),
    )
}

fn check_num_subs_list(num_subs: &[usize]) -> Result<(), EngineError> {
    if num_subs.is_empty() {
        return Err(EngineError::Configuration(
            "at least one substitution count is required".to_string(),
        ));
    }
    if let Some(dup) = num_subs.iter().duplicates().next() {
        return Err(EngineError::Configuration(format!(
            "substitution count {} is listed more than once",
            dup
        )));
    }
    Ok(())
}

fn generate_every(
    request: &GenerationRequest,
    config: &GenerationConfig,
    num_subs: &[usize],
    reporter: &ProgressReporter,
) -> Result<Vec<Variant>, EngineError> {
    check_num_subs_list(num_subs)?;
    let spaces = num_subs
        .iter()
        .map(|&k| generate_all(&request.sequence, k, &config.alphabet, &request.positions))
        .collect::<Result<Vec<_>, _>>()?;
    for space in &spaces {
        info!(
            num_subs = space.num_subs(),
            count = space.len(),
            "Enumerating every variant"
        );
    }

    let total = spaces
        .iter()
        .fold(0u64, |acc, space| acc.saturating_add(space.len()));
    reporter.report(Progress::TaskStart { total_steps: total });
    let mut variants = Vec::new();
    for space in &spaces {
        variants.extend(space.iter());
        reporter.report(Progress::TaskAdvance { steps: space.len() });
    }
    reporter.report(Progress::TaskFinish);
    Ok(variants)
}

fn generate_random<R: Rng + ?Sized>(
    sampler: &VariantSampler,
    target: u64,
    num_subs: &[usize],
    rng: &mut R,
    reporter: &ProgressReporter,
) -> Result<Vec<Variant>, EngineError> {
    check_num_subs_list(num_subs)?;
    let capacities: Vec<u64> = num_subs.iter().map(|&k| sampler.space_size(k)).collect();
    let counts = allocate(target, &capacities)?;

    reporter.report(Progress::TaskStart {
        total_steps: target,
    });
    let mut variants = Vec::with_capacity(target as usize);
    for (&k, &count) in num_subs.iter().zip(&counts) {
        info!(num_subs = k, count, max = sampler.space_size(k), "Sampling variants");
        variants.extend(sampler.sample(k, count, rng)?);
        reporter.report(Progress::TaskAdvance { steps: count });
    }
    reporter.report(Progress::TaskFinish);
    Ok(variants)
}

fn replicate(variants: Vec<Variant>, replicates: usize) -> Result<Vec<Variant>, EngineError> {
    if replicates == 0 {
        return Err(EngineError::Configuration(
            "number of replicates must be at least 1".to_string(),
        ));
    }
    let mut all = Vec::with_capacity(variants.len() * replicates);
    for _ in 0..replicates {
        all.extend(variants.iter().cloned());
    }
    Ok(all)
}
