use clap::{Args, Parser, Subcommand};
use mutscan::core::io::results::DEFAULT_KEY_COLUMN;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "MutScan CLI - Generates combinatorial mutagenesis variant lists and packages them into balanced batches for distributed compute jobs.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output and progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a master variant list for one structure.
    Generate(GenerateArgs),
    /// Split master variant lists into per-job batch files and archive them.
    Partition(PartitionArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(subcommand)]
    pub method: GenerateMethod,
}

/// Available generation methods.
#[derive(Subcommand, Debug)]
pub enum GenerateMethod {
    /// Enumerate every variant with the given numbers of substitutions.
    All {
        #[command(flatten)]
        input: GenerateInputArgs,

        /// Numbers of substitutions per variant, e.g. `1,2`.
        #[arg(short = 'k', long, value_delimiter = ',', required = true, value_name = "K,...")]
        num_subs: Vec<usize>,
    },
    /// Sample distinct random variants, split evenly across substitution counts.
    Random {
        #[command(flatten)]
        input: GenerateInputArgs,

        /// Total number of distinct variants to sample.
        #[arg(short = 'n', long, value_name = "INT")]
        target: u64,

        /// Numbers of substitutions per variant, e.g. `1,2`.
        #[arg(short = 'k', long, value_delimiter = ',', required = true, value_name = "K,...")]
        num_subs: Vec<usize>,

        /// Write the sampled list this many times (for variance testing).
        #[arg(long, default_value_t = 1, value_name = "INT")]
        replicates: usize,

        /// Random seed; a nine-digit seed is generated and logged when omitted.
        #[arg(short = 'r', long, value_name = "INT")]
        seed: Option<u64>,
    },
    /// Sample main variants and emit their closures of smaller sub-variants.
    Subvariants {
        #[command(flatten)]
        input: GenerateInputArgs,

        /// Minimum number of emitted variants; whole closures may overshoot it.
        #[arg(short = 'n', long, value_name = "INT")]
        target: u64,

        /// Number of substitutions of each main variant.
        #[arg(long, value_name = "INT")]
        max_subs: usize,

        /// Smallest sub-variant size to emit.
        #[arg(long, default_value_t = 1, value_name = "INT")]
        min_subs: usize,

        /// Random seed; a nine-digit seed is generated and logged when omitted.
        #[arg(short = 'r', long, value_name = "INT")]
        seed: Option<u64>,

        /// CSV export of the results store; variants listed there are skipped.
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Column of the CSV export that holds the variant keys.
        #[arg(long, default_value = DEFAULT_KEY_COLUMN, value_name = "NAME", requires = "db")]
        db_column: String,
    },
}

/// Inputs shared by every generation method.
#[derive(Args, Debug, Clone)]
pub struct GenerateInputArgs {
    /// FASTA file holding the reference sequence.
    #[arg(short, long, value_name = "PATH")]
    pub fasta: PathBuf,

    /// Record to use from the FASTA file; may be omitted when it holds a single record.
    #[arg(long, value_name = "ID")]
    pub record: Option<String>,

    /// Structure id written in front of every variant (defaults to the record id).
    #[arg(short = 's', long = "structure", value_name = "ID")]
    pub structure_id: Option<String>,

    /// One-based positions eligible for substitution (default: every position).
    #[arg(long, value_delimiter = ',', value_name = "POS,...")]
    pub positions: Vec<usize>,

    /// Residues that substitutions may introduce, overriding the config file.
    #[arg(short, long, value_name = "RESIDUES")]
    pub alphabet: Option<String>,

    /// Directory the master list is written to.
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S generation.density-threshold=0.3
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `partition` subcommand.
#[derive(Args, Debug)]
pub struct PartitionArgs {
    /// Master variant lists, concatenated in the given order.
    #[arg(required = true, value_name = "LIST")]
    pub master_lists: Vec<PathBuf>,

    /// Directory receiving `args/`, `args.tar.zst` and `env_vars.txt`.
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Put exactly this many variants in each job instead of balancing by runtime.
    #[arg(short = 'n', long, value_name = "INT", conflicts_with = "hours_per_job")]
    pub variants_per_job: Option<usize>,

    /// Estimated runtime budget per job, overriding the config file.
    #[arg(long, value_name = "FLOAT")]
    pub hours_per_job: Option<f64>,

    /// FASTA file with the sequence of every structure in the lists
    /// (required unless --variants-per-job is given).
    #[arg(short, long, value_name = "PATH")]
    pub fasta: Option<PathBuf>,

    /// Keep the loose batch files next to the archive.
    #[arg(long)]
    pub keep_batch_files: bool,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S partition.hours-per-job=2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}
