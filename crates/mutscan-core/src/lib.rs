//! # MutScan Core Library
//!
//! Prepares large-scale combinatorial mutagenesis studies for distributed execution:
//! enumerating or sampling substitution variants of a reference sequence, expanding
//! variants into their sub-variant closures, and partitioning the resulting master list
//! into balanced job batches.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout:
//!
//! - **[`core`]: The Foundation.** Immutable data models (`Sequence`, `Variant`,
//!   `VariantSet`), plain-text I/O for variant lists, FASTA sequences and the
//!   existing-results index, and small combinatorial helpers.
//!
//! - **[`engine`]: The Logic Core.** The generation and partitioning algorithms: the
//!   exhaustive enumerator, the rejection sampler, the capacity-constrained bucket
//!   allocator, the sub-variant expander and the runtime-aware job partitioner.
//!
//! - **[`workflows`]: The Public API.** Complete preparation procedures that tie the
//!   engine to the data model, choose output names, and refuse to overwrite results.

pub mod core;
pub mod engine;
pub mod workflows;
