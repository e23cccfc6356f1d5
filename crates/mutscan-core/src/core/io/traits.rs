use crate::core::models::sequence::Sequence;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SequenceSourceError {
    #[error("No sequence is available for structure '{0}'")]
    UnknownStructure(String),
}

/// Supplies the reference sequence of a structure.
///
/// Reading structure files is left to whoever builds the source; the engine only
/// ever asks for a sequence by structure id.
pub trait SequenceSource {
    fn sequence(&self, structure_id: &str) -> Result<&Sequence, SequenceSourceError>;
}

impl SequenceSource for HashMap<String, Sequence> {
    fn sequence(&self, structure_id: &str) -> Result<&Sequence, SequenceSourceError> {
        self.get(structure_id)
            .ok_or_else(|| SequenceSourceError::UnknownStructure(structure_id.to_string()))
    }
}

/// Answers whether a variant (by canonical key) already has a computed result, so
/// that generation can avoid scheduling it again.
pub trait ExistingResults {
    fn contains(&self, variant_key: &str) -> bool;
}

/// An index that knows no results.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExistingResults;

impl ExistingResults for NoExistingResults {
    fn contains(&self, _variant_key: &str) -> bool {
        false
    }
}

impl ExistingResults for HashSet<String> {
    fn contains(&self, variant_key: &str) -> bool {
        HashSet::contains(self, variant_key)
    }
}

impl<T: ExistingResults + ?Sized> ExistingResults for &T {
    fn contains(&self, variant_key: &str) -> bool {
        (**self).contains(variant_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_map_source_looks_up_by_structure_id() {
        let mut map = HashMap::new();
        map.insert("a.pdb".to_string(), Sequence::new("ACD").unwrap());
        assert_eq!(map.sequence("a.pdb").unwrap().len(), 3);
        assert_eq!(
            map.sequence("b.pdb"),
            Err(SequenceSourceError::UnknownStructure("b.pdb".to_string()))
        );
    }

    #[test]
    fn existing_results_fakes_answer_membership() {
        let known: HashSet<String> = ["A1G".to_string()].into_iter().collect();
        assert!(ExistingResults::contains(&known, "A1G"));
        assert!(!ExistingResults::contains(&known, "A1C"));
        assert!(!NoExistingResults.contains("A1G"));
    }
}
