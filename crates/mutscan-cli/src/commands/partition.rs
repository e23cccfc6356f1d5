use super::generate::read_fasta;
use crate::archive::TarZstdArchiver;
use crate::cli::PartitionArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use mutscan::core::io::traits::SequenceSource;
use mutscan::engine::config::PartitionConfig;
use mutscan::engine::partition::JobPartitioner;
use mutscan::engine::progress::ProgressReporter;
use mutscan::workflows::package;
use tracing::info;

pub fn run(args: PartitionArgs, show_progress: bool) -> Result<()> {
    let config = PartialConfig::load(args.config.as_deref(), &args.set_values)?
        .into_partition_config(args.variants_per_job, args.hours_per_job)?;

    let sequences = match (&config, &args.fasta) {
        (PartitionConfig::CostBalanced { .. }, None) => {
            return Err(CliError::Argument(
                "balancing jobs by runtime needs --fasta with the structures' sequences \
                 (or use --variants-per-job)"
                    .to_string(),
            ));
        }
        (_, Some(path)) => {
            info!("Loading sequences from {:?}", path);
            Some(read_fasta(path)?)
        }
        (_, None) => None,
    };

    let partitioner = JobPartitioner::new(config);
    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let output = package::run(
        &args.master_lists,
        &partitioner,
        sequences.as_ref().map(|s| s as &dyn SequenceSource),
        &TarZstdArchiver,
        args.keep_batch_files,
        &args.out_dir,
        &reporter,
    )?;

    let summary = &output.summary;
    println!(
        "✓ Packaged {} variants into {} jobs: {}",
        summary.descriptor_count,
        summary.job_count,
        output.layout.archive.display()
    );
    if let Some((min, max)) = summary.cost_range {
        println!(
            "  Estimated job runtime: {:.2} to {:.2} hours",
            min / 3600.0,
            max / 3600.0
        );
    }
    println!("  Job count recorded in {}", output.layout.env_vars.display());
    Ok(())
}
