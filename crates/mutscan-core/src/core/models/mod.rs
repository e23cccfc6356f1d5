//! Data model for mutagenesis studies.
//!
//! A [`sequence::Sequence`] is the reference ("wild type") that every
//! [`variant::Variant`] is expressed against. Variants serialize to a canonical
//! comma-joined string (e.g. `A12G,K40R`), which doubles as their identity key.

pub mod batch;
pub mod descriptor;
pub mod sequence;
pub mod variant;
pub mod variant_set;
