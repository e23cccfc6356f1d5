//! Small helpers shared across the crate: combinatorial counting for variant spaces
//! and compact number formatting for output file names.

pub mod combinatorics;
pub mod format;
