//! # Workflows Module
//!
//! Top-level entry points that turn user requests into files on disk.
//!
//! ## Overview
//!
//! Each workflow resolves its inputs, drives the [`crate::engine`] algorithms, reports
//! progress, and writes its outputs only after checking that none of them exist yet.
//! A failed workflow leaves no partial output behind.
//!
//! - **Generation** ([`generate`]) - Builds a master variant list for one structure with
//!   the `all`, `random` or `subvariants` method, named after its parameters.
//! - **Packaging** ([`package`]) - Splits one or more master lists into numbered job
//!   batch files and records the job count for the scheduler.

pub mod generate;
pub mod package;
