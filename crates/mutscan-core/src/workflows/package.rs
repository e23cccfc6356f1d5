use crate::core::io::batches::write_batches;
use crate::core::io::traits::SequenceSource;
use crate::core::io::variant_list::VariantListFile;
use crate::engine::error::EngineError;
use crate::engine::partition::{JobPartitioner, Partition, PartitionSummary};
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub const BATCH_DIR_NAME: &str = "args";
pub const ARCHIVE_NAME: &str = "args.tar.zst";
pub const ENV_VARS_NAME: &str = "env_vars.txt";

/// Bundles a complete batch directory into one archive file.
pub trait BatchArchiver {
    /// Writes `archive_path`, which does not exist yet, from the files in `batch_dir`.
    fn archive(&self, batch_dir: &Path, archive_path: &Path) -> io::Result<()>;
}

/// Where a packaging run puts its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    pub batch_dir: PathBuf,
    pub archive: PathBuf,
    pub env_vars: PathBuf,
}

impl PackageLayout {
    pub fn new(out_dir: &Path) -> Self {
        Self {
            batch_dir: out_dir.join(BATCH_DIR_NAME),
            archive: out_dir.join(ARCHIVE_NAME),
            env_vars: out_dir.join(ENV_VARS_NAME),
        }
    }

    /// Fails with the first output path that already exists.
    pub fn ensure_vacant(&self) -> Result<(), EngineError> {
        for path in [&self.batch_dir, &self.archive, &self.env_vars] {
            if path.exists() {
                return Err(EngineError::OutputConflict { path: path.clone() });
            }
        }
        Ok(())
    }

    /// Removes whatever a failed run managed to write. Only called after
    /// [`Self::ensure_vacant`] succeeded, so every path here belongs to this run.
    fn discard(&self) {
        let removed = [
            fs::remove_dir_all(&self.batch_dir),
            fs::remove_file(&self.archive),
            fs::remove_file(&self.env_vars),
        ];
        for (path, result) in [&self.batch_dir, &self.archive, &self.env_vars]
            .into_iter()
            .zip(removed)
        {
            match result {
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    warn!("Could not remove partial output {:?}: {}", path, e)
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackageOutput {
    pub layout: PackageLayout,
    /// Batch files in job order. They exist on disk only when `keep_batch_files` was set.
    pub batch_files: Vec<PathBuf>,
    pub summary: PartitionSummary,
}

/// Reads and concatenates `master_lists`, partitions the descriptors, writes one batch
/// file per job, bundles them with `archiver` and finally records the `NUM_JOBS` export.
///
/// Outputs are all-or-nothing: when any step after the vacancy check fails, the batch
/// directory, archive and export file written so far are removed again.
#[instrument(skip_all, name = "package_workflow", fields(lists = master_lists.len()))]
pub fn run<P: AsRef<Path>>(
    master_lists: &[P],
    partitioner: &JobPartitioner,
    sequences: Option<&dyn SequenceSource>,
    archiver: &dyn BatchArchiver,
    keep_batch_files: bool,
    out_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<PackageOutput, EngineError> {
    let layout = PackageLayout::new(out_dir);
    layout.ensure_vacant()?;

    reporter.phase("Reading master lists");
    let descriptors = VariantListFile::read_from_paths(master_lists)?;
    info!(descriptors = descriptors.len(), "Loaded master lists");
    reporter.report(Progress::PhaseFinish);

    reporter.phase("Partitioning");
    let partition = partitioner.partition(descriptors, sequences)?;
    reporter.report(Progress::PhaseFinish);

    fs::create_dir_all(out_dir)?;
    let batch_files = write_or_discard(&layout, &partition, archiver, keep_batch_files, reporter)?;

    match partition.summary.cost_range {
        Some((min, max)) => info!(
            jobs = partition.summary.job_count,
            min_cost_secs = min,
            max_cost_secs = max,
            "Wrote job batches"
        ),
        None => info!(jobs = partition.summary.job_count, "Wrote job batches"),
    }

    Ok(PackageOutput {
        layout,
        batch_files,
        summary: partition.summary,
    })
}

fn write_or_discard(
    layout: &PackageLayout,
    partition: &Partition,
    archiver: &dyn BatchArchiver,
    keep_batch_files: bool,
    reporter: &ProgressReporter,
) -> Result<Vec<PathBuf>, EngineError> {
    write_outputs(layout, partition, archiver, keep_batch_files, reporter).inspect_err(|e| {
        warn!("Packaging failed, removing partial outputs: {}", e);
        layout.discard();
    })
}

fn write_outputs(
    layout: &PackageLayout,
    partition: &Partition,
    archiver: &dyn BatchArchiver,
    keep_batch_files: bool,
    reporter: &ProgressReporter,
) -> Result<Vec<PathBuf>, EngineError> {
    reporter.phase("Writing job batches");
    reporter.report(Progress::TaskStart {
        total_steps: partition.batches.len() as u64,
    });
    let batch_files = write_batches(&layout.batch_dir, &partition.batches)?;
    reporter.report(Progress::TaskAdvance {
        steps: batch_files.len() as u64,
    });
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    reporter.phase("Archiving job batches");
    archiver.archive(&layout.batch_dir, &layout.archive)?;
    write_env_vars(&layout.env_vars, partition.summary.job_count)?;
    if !keep_batch_files {
        fs::remove_dir_all(&layout.batch_dir)?;
        reporter.message(format!("Removed loose batch files in {:?}", layout.batch_dir));
    }
    reporter.report(Progress::PhaseFinish);
    Ok(batch_files)
}

fn write_env_vars(path: &Path, job_count: usize) -> Result<(), EngineError> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    writeln!(file, "export NUM_JOBS={}", job_count)?;
    Ok(())
}
