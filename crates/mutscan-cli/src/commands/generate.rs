use crate::cli::{GenerateArgs, GenerateInputArgs, GenerateMethod};
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use mutscan::core::io::fasta::FastaSequences;
use mutscan::core::io::results::ResultsIndex;
use mutscan::core::io::traits::SequenceSource;
use mutscan::core::models::sequence::{MutablePositions, Sequence};
use mutscan::engine::progress::ProgressReporter;
use mutscan::workflows::generate::{self, GenerationMethod, GenerationRequest};
use std::path::Path;
use tracing::info;

pub fn run(args: GenerateArgs, show_progress: bool) -> Result<()> {
    let (input, method, seed, db) = match args.method {
        GenerateMethod::All { input, num_subs } => {
            (input, GenerationMethod::All { num_subs }, None, None)
        }
        GenerateMethod::Random {
            input,
            target,
            num_subs,
            replicates,
            seed,
        } => (
            input,
            GenerationMethod::Random {
                target,
                num_subs,
                replicates,
            },
            Some(seed),
            None,
        ),
        GenerateMethod::Subvariants {
            input,
            target,
            max_subs,
            min_subs,
            seed,
            db,
            db_column,
        } => (
            input,
            GenerationMethod::Subvariants {
                target,
                min_subs,
                max_subs,
            },
            Some(seed),
            db.map(|path| (path, db_column)),
        ),
    };

    let config = PartialConfig::load(input.config.as_deref(), &input.set_values)?
        .into_generation_config(input.alphabet.as_deref())?;
    info!("Using alphabet {} ({} residues)", config.alphabet, config.alphabet.len());

    let (record_id, sequence) = load_sequence(&input)?;
    let positions = resolve_positions(&sequence, &input.positions)?;
    let structure_id = input.structure_id.clone().unwrap_or(record_id);
    info!(
        "Reference '{}': {} residues, {} mutable positions",
        structure_id,
        sequence.len(),
        positions.len()
    );

    let existing = match &db {
        Some((path, column)) => {
            info!("Loading existing results from {:?} (column '{}')", path, column);
            let index = ResultsIndex::from_csv_path(path, column).map_err(|e| {
                CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                }
            })?;
            println!(
                "Loaded {} existing results (fingerprint {}).",
                index.len(),
                index.fingerprint()
            );
            Some(index)
        }
        None => None,
    };

    // `all` draws nothing at random and has no seed in its file name.
    let seed = match seed {
        Some(given) => generate::resolve_seed(given),
        None => 0,
    };
    if !matches!(method, GenerationMethod::All { .. }) {
        println!("Random seed: {}", seed);
    }

    let request = GenerationRequest {
        structure_id,
        sequence,
        positions,
        method,
        seed,
    };

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let (path, output) = generate::run(
        &request,
        &config,
        existing.as_ref(),
        &input.out_dir,
        &reporter,
    )?;

    println!(
        "✓ Wrote {} variants to {}",
        output.descriptors.len(),
        path.display()
    );
    for (size, count) in &output.summary.counts_by_size {
        println!("  {}-substitution variants: {}", size, count);
    }
    Ok(())
}

fn load_sequence(input: &GenerateInputArgs) -> Result<(String, Sequence)> {
    let fasta = read_fasta(&input.fasta)?;
    match &input.record {
        Some(id) => {
            let sequence = fasta.sequence(id).map_err(|e| CliError::Argument(e.to_string()))?;
            Ok((id.clone(), sequence.clone()))
        }
        None => fasta
            .single()
            .map(|(id, sequence)| (id.to_string(), sequence.clone()))
            .ok_or_else(|| {
                CliError::Argument(format!(
                    "{:?} holds {} records; choose one with --record",
                    input.fasta,
                    fasta.len()
                ))
            }),
    }
}

pub(crate) fn read_fasta(path: &Path) -> Result<FastaSequences> {
    FastaSequences::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Converts one-based CLI positions to validated zero-based ones; empty means all.
fn resolve_positions(sequence: &Sequence, one_based: &[usize]) -> Result<MutablePositions> {
    if one_based.is_empty() {
        return Ok(sequence.all_positions());
    }
    let zero_based = one_based
        .iter()
        .map(|&p| {
            p.checked_sub(1).ok_or_else(|| {
                CliError::Argument("positions are one-based; 0 is invalid".to_string())
            })
        })
        .collect::<Result<Vec<_>>>()?;
    MutablePositions::new(sequence, &zero_based).map_err(|e| CliError::Argument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;

    const GB1: &str = "MQYKLILNGKTLKGETTTEAVDAATAEKVFKQYANDNGVDGEWTYDDATKTFTVTE";

    fn parse_generate(args: &[&str]) -> GenerateArgs {
        match Cli::parse_from(args).command {
            Commands::Generate(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn positions_are_converted_from_one_based() {
        let seq = Sequence::new("ACDEF").unwrap();
        assert_eq!(resolve_positions(&seq, &[5, 1]).unwrap().as_slice(), &[0, 4]);
        assert_eq!(resolve_positions(&seq, &[]).unwrap().len(), 5);
        assert!(matches!(
            resolve_positions(&seq, &[0]),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            resolve_positions(&seq, &[6]),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn random_command_writes_a_named_master_list() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("gb1.fasta");
        fs::write(&fasta, format!(">2qmt.pdb\n{}\n", GB1)).unwrap();
        let out = dir.path().join("lists");

        let args = parse_generate(&[
            "mutscan",
            "generate",
            "random",
            "-f",
            fasta.to_str().unwrap(),
            "-n",
            "100",
            "-k",
            "1,2",
            "-r",
            "42",
            "-o",
            out.to_str().unwrap(),
        ]);
        run(args, false).unwrap();

        let written = out.join("2qmt_random_TN-100_NR-1_NS-1,2_RS-42.txt");
        let content = fs::read_to_string(&written).unwrap();
        assert_eq!(content.lines().count(), 100);
        assert!(content.lines().all(|l| l.starts_with("2qmt.pdb ")));
    }

    #[test]
    fn multi_record_fasta_requires_a_record_choice() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("two.fasta");
        fs::write(&fasta, ">a\nACDE\n>b\nMQYK\n").unwrap();

        let args = parse_generate(&[
            "mutscan",
            "generate",
            "all",
            "-f",
            fasta.to_str().unwrap(),
            "-k",
            "1",
            "-o",
            dir.path().to_str().unwrap(),
        ]);
        assert!(matches!(run(args, false), Err(CliError::Argument(_))));

        let args = parse_generate(&[
            "mutscan",
            "generate",
            "all",
            "-f",
            fasta.to_str().unwrap(),
            "--record",
            "b",
            "-s",
            "b.pdb",
            "-k",
            "1",
            "-o",
            dir.path().to_str().unwrap(),
        ]);
        run(args, false).unwrap();
        let content = fs::read_to_string(dir.path().join("b_all_NS-1.txt")).unwrap();
        assert_eq!(content.lines().count(), 4 * 19);
        assert!(content.starts_with("b.pdb M1A\n"));
    }
}
