//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! - **Data Model** ([`models`]) - Sequences, alphabets, substitutions, variants and
//!   variant descriptors, with their canonical text forms
//! - **File I/O** ([`io`]) - Variant-list files, FASTA sequence sources, the
//!   existing-results index and job batch files
//! - **Utilities** ([`utils`]) - Combinatorial counting and number formatting
//!
//! Every type here is created once per preparation run and not mutated afterwards,
//! with the exception of [`models::variant_set::VariantSet`], which grows while
//! variants are generated.

pub mod io;
pub mod models;
pub mod utils;
