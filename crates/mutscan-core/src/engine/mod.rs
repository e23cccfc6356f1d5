//! # Engine Module
//!
//! The variant-generation and job-partitioning algorithms.
//!
//! ## Architecture
//!
//! - **Enumeration** ([`enumerator`]) - Exhaustive, lazy, restartable walk over every
//!   variant with a fixed number of substitutions
//! - **Sampling** ([`sampler`]) - Seeded sampling without replacement over the same space,
//!   switching from rejection sampling to enumerate-then-draw as density rises
//! - **Allocation** ([`allocation`]) - Capacity-respecting water-filling used to split a
//!   target count across substitution counts
//! - **Expansion** ([`subvariants`]) - Closures of smaller sub-variants, deduplicated
//!   locally and against an existing-results index
//! - **Partitioning** ([`partition`], [`runtime`]) - Fixed-size or cost-balanced job batches
//! - **Configuration** ([`config`]), **Errors** ([`error`]), **Progress** ([`progress`])
//!
//! Every algorithm is single-threaded and deterministic for a given seed. Loops that
//! retry are bounded by configurable caps or by the known size of the variant space.

pub mod allocation;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod partition;
pub mod progress;
pub mod runtime;
pub mod sampler;
pub mod subvariants;
