use super::error::EngineError;
use crate::core::models::sequence::{Alphabet, MutablePositions, Sequence, SequenceError};
use crate::core::models::variant::{Substitution, Variant};
use itertools::Itertools;

/// Per-position substitution options: for each mutable position, the reference
/// residue and every alphabet residue that differs from it, in alphabet order.
#[derive(Debug, Clone)]
pub(crate) struct ResidueChoices {
    positions: Vec<usize>,
    originals: Vec<char>,
    replacements: Vec<Vec<char>>,
}

impl ResidueChoices {
    pub(crate) fn new(
        sequence: &Sequence,
        alphabet: &Alphabet,
        positions: &MutablePositions,
    ) -> Result<Self, EngineError> {
        let mut kept = Vec::with_capacity(positions.len());
        let mut originals = Vec::with_capacity(positions.len());
        let mut replacements = Vec::with_capacity(positions.len());
        for &position in positions.as_slice() {
            let original = sequence
                .residue(position)
                .ok_or(SequenceError::PositionOutOfRange {
                    position,
                    length: sequence.len(),
                })?;
            let options = alphabet.replacements_for(original);
            // A position whose only alphabet residue is its own cannot be mutated.
            if options.is_empty() {
                continue;
            }
            kept.push(position);
            originals.push(original);
            replacements.push(options);
        }
        Ok(Self {
            positions: kept,
            originals,
            replacements,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn replacements(&self, slot: usize) -> &[char] {
        &self.replacements[slot]
    }

    /// Builds the variant for the given slots (ascending) and their chosen residues.
    pub(crate) fn variant(&self, slots: &[usize], residues: &[char]) -> Variant {
        let substitutions = slots
            .iter()
            .zip(residues)
            .map(|(&slot, &residue)| {
                Substitution::from_parts(self.originals[slot], self.positions[slot], residue)
            })
            .collect();
        Variant::from_sorted(substitutions)
    }

    /// Exact number of variants with `num_subs` substitutions: the elementary
    /// symmetric polynomial of the per-position replacement counts.
    pub(crate) fn space_size(&self, num_subs: usize) -> u64 {
        if num_subs > self.len() {
            return 0;
        }
        let mut sums = vec![0u128; num_subs + 1];
        sums[0] = 1;
        for options in &self.replacements {
            let c = options.len() as u128;
            for j in (1..=num_subs).rev() {
                sums[j] = sums[j].saturating_add(sums[j - 1].saturating_mul(c));
            }
        }
        u64::try_from(sums[num_subs]).unwrap_or(u64::MAX)
    }
}

/// Every valid variant with a fixed number of substitutions.
///
/// Positions are combined in lexicographic index order; for each combination the
/// residues run through the alphabet with the last position varying fastest. Calling
/// [`VariantSpace::iter`] again restarts the walk from the beginning.
#[derive(Debug, Clone)]
pub struct VariantSpace {
    choices: ResidueChoices,
    num_subs: usize,
}

impl VariantSpace {
    pub(crate) fn from_choices(choices: ResidueChoices, num_subs: usize) -> Self {
        Self { choices, num_subs }
    }

    pub fn num_subs(&self) -> usize {
        self.num_subs
    }

    /// Number of variants [`Self::iter`] yields. Equals C(n, k)·(a − 1)^k when every
    /// reference residue at a mutable position belongs to the alphabet.
    pub fn len(&self) -> u64 {
        self.choices.space_size(self.num_subs)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Variant> + '_ {
        let choices = &self.choices;
        (0..choices.len())
            .combinations(self.num_subs)
            .flat_map(move |slots| {
                let axes: Vec<_> = slots
                    .iter()
                    .map(|&slot| choices.replacements(slot).to_vec().into_iter())
                    .collect();
                axes.into_iter()
                    .multi_cartesian_product()
                    .map(move |residues| choices.variant(&slots, &residues))
            })
    }
}

/// Prepares the exhaustive enumeration of variants with `num_subs` substitutions.
///
/// `num_subs == 0` is rejected; `num_subs` larger than the number of mutable positions
/// yields an empty space.
pub fn generate_all(
    sequence: &Sequence,
    num_subs: usize,
    alphabet: &Alphabet,
    positions: &MutablePositions,
) -> Result<VariantSpace, EngineError> {
    if num_subs == 0 {
        return Err(EngineError::Configuration(
            "number of substitutions must be at least 1".to_string(),
        ));
    }
    let choices = ResidueChoices::new(sequence, alphabet, positions)?;
    Ok(VariantSpace::from_choices(choices, num_subs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::combinatorics::max_possible_variants;
    use std::collections::HashSet;

    fn setup(seq: &str, alphabet: &str) -> (Sequence, Alphabet, MutablePositions) {
        let sequence = Sequence::new(seq).unwrap();
        let alphabet = Alphabet::new(alphabet).unwrap();
        let positions = sequence.all_positions();
        (sequence, alphabet, positions)
    }

    #[test]
    fn cardinality_matches_closed_form() {
        let (seq, alphabet, positions) = setup("ACDEF", "ACDEFG");
        for k in 1..=3 {
            let space = generate_all(&seq, k, &alphabet, &positions).unwrap();
            let expected = max_possible_variants(5, k, 6);
            assert_eq!(space.len(), expected);
            assert_eq!(space.iter().count() as u64, expected);
        }
    }

    #[test]
    fn variants_are_unique_and_never_no_ops() {
        let (seq, alphabet, positions) = setup("ACDE", "ACDE");
        let space = generate_all(&seq, 2, &alphabet, &positions).unwrap();
        let mut keys = HashSet::new();
        for variant in space.iter() {
            assert!(keys.insert(variant.key()), "duplicate {}", variant);
            assert_eq!(variant.len(), 2);
            for sub in variant.substitutions() {
                assert_ne!(sub.original(), sub.replacement());
                assert_eq!(seq.residue(sub.position()), Some(sub.original()));
            }
        }
        assert_eq!(keys.len(), 6 * 9);
    }

    #[test]
    fn enumeration_order_is_lexicographic() {
        let (seq, alphabet, positions) = setup("AC", "ACD");
        let space = generate_all(&seq, 1, &alphabet, &positions).unwrap();
        let keys: Vec<String> = space.iter().map(|v| v.key()).collect();
        assert_eq!(keys, vec!["A1C", "A1D", "C2A", "C2D"]);

        let pairs = generate_all(&seq, 2, &alphabet, &positions).unwrap();
        let keys: Vec<String> = pairs.iter().map(|v| v.key()).collect();
        assert_eq!(keys, vec!["A1C,C2A", "A1C,C2D", "A1D,C2A", "A1D,C2D"]);
    }

    #[test]
    fn iteration_is_restartable() {
        let (seq, alphabet, positions) = setup("ACD", "ACDE");
        let space = generate_all(&seq, 2, &alphabet, &positions).unwrap();
        let first: Vec<Variant> = space.iter().collect();
        let second: Vec<Variant> = space.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_substitutions_is_a_configuration_error() {
        let (seq, alphabet, positions) = setup("ACD", "ACDE");
        assert!(matches!(
            generate_all(&seq, 0, &alphabet, &positions),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn more_substitutions_than_positions_is_empty() {
        let (seq, alphabet, positions) = setup("ACD", "ACDE");
        let space = generate_all(&seq, 4, &alphabet, &positions).unwrap();
        assert!(space.is_empty());
        assert_eq!(space.iter().count(), 0);
    }

    #[test]
    fn restricted_positions_limit_the_space() {
        let seq = Sequence::new("ACDEF").unwrap();
        let alphabet = Alphabet::new("ACDEF").unwrap();
        let positions = MutablePositions::new(&seq, &[1, 3]).unwrap();
        let space = generate_all(&seq, 1, &alphabet, &positions).unwrap();
        let touched: HashSet<usize> = space
            .iter()
            .map(|v| v.substitutions()[0].position())
            .collect();
        assert_eq!(touched, HashSet::from([1, 3]));
        assert_eq!(space.len(), 8);
    }

    #[test]
    fn residues_outside_the_alphabet_get_every_replacement() {
        let (seq, alphabet, positions) = setup("XA", "AC");
        let space = generate_all(&seq, 1, &alphabet, &positions).unwrap();
        assert_eq!(space.len(), 3);
        assert_eq!(space.iter().count(), 3);
    }
}
