//! Plain-text I/O for the preparation pipeline.
//!
//! - [`variant_list`] reads and writes master variant lists (`<structure-id> <variant>`)
//! - [`fasta`] provides reference sequences keyed by structure id
//! - [`results`] loads the existing-results index exported from the results store
//! - [`batches`] writes numbered job batch files
//! - [`traits`] defines the sequence-source and existing-results seams

pub mod batches;
pub mod fasta;
pub mod results;
pub mod traits;
pub mod variant_list;
