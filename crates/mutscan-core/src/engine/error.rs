use super::config::ConfigError;
use crate::core::io::fasta::FastaError;
use crate::core::io::results::ResultsIndexError;
use crate::core::io::traits::SequenceSourceError;
use crate::core::io::variant_list::VariantListError;
use crate::core::models::sequence::SequenceError;
use crate::core::models::variant::VariantError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "Could not produce {requested} distinct {num_subs}-substitution variants (found {found}): {reason}"
    )]
    Exhaustion {
        num_subs: usize,
        requested: u64,
        found: u64,
        reason: String,
    },

    #[error("Refusing to overwrite existing output: {path}", path = path.display())]
    OutputConflict { path: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid sequence input: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Invalid variant: {0}")]
    Variant(#[from] VariantError),

    #[error(transparent)]
    SequenceSource(#[from] SequenceSourceError),

    #[error("Variant list error: {0}")]
    VariantList(#[from] VariantListError),

    #[error("FASTA error: {0}")]
    Fasta(#[from] FastaError),

    #[error("Existing-results index error: {0}")]
    ResultsIndex(#[from] ResultsIndexError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
