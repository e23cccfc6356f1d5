use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const STANDARD_AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

/// Digits hold the position and commas join substitutions in a variant key, so
/// neither may stand for a residue.
fn check_residue(residue: char) -> Result<char, SequenceError> {
    if residue.is_ascii_digit() || residue == ',' {
        Err(SequenceError::InvalidResidue(residue))
    } else {
        Ok(residue)
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SequenceError {
    #[error("Sequence cannot be empty")]
    EmptySequence,
    #[error("Alphabet cannot be empty")]
    EmptyAlphabet,
    #[error("'{0}' cannot be used as a residue")]
    InvalidResidue(char),
    #[error("Alphabet contains residue '{0}' more than once")]
    DuplicateResidue(char),
    #[error("Position {position} is out of range for a sequence of length {length}")]
    PositionOutOfRange { position: usize, length: usize },
    #[error("Position {0} is listed more than once")]
    DuplicatePosition(usize),
}

/// The reference ("wild type") residue sequence that variants are expressed against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    residues: Vec<char>,
}

impl Sequence {
    pub fn new(residues: &str) -> Result<Self, SequenceError> {
        let residues = residues
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(check_residue)
            .collect::<Result<Vec<char>, _>>()?;
        if residues.is_empty() {
            return Err(SequenceError::EmptySequence);
        }
        Ok(Self { residues })
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn residue(&self, position: usize) -> Option<char> {
        self.residues.get(position).copied()
    }

    pub fn residues(&self) -> &[char] {
        &self.residues
    }

    /// Every position of the sequence, the default set of mutable positions.
    pub fn all_positions(&self) -> MutablePositions {
        MutablePositions {
            indices: (0..self.residues.len()).collect(),
        }
    }
}

impl FromStr for Sequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for residue in &self.residues {
            write!(f, "{}", residue)?;
        }
        Ok(())
    }
}

/// Ordered set of residues that substitutions may introduce.
///
/// The order matters: the enumerator walks residues in alphabet order, so two
/// alphabets with the same members but different orders produce different
/// (equally valid) enumeration orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    residues: Vec<char>,
}

impl Alphabet {
    pub fn new(residues: &str) -> Result<Self, SequenceError> {
        let mut seen = Vec::new();
        for residue in residues.chars().filter(|c| !c.is_whitespace() && *c != ',') {
            let residue = check_residue(residue)?;
            if seen.contains(&residue) {
                return Err(SequenceError::DuplicateResidue(residue));
            }
            seen.push(residue);
        }
        if seen.is_empty() {
            return Err(SequenceError::EmptyAlphabet);
        }
        Ok(Self { residues: seen })
    }

    /// The 20 canonical amino acids by one-letter code.
    pub fn standard_amino_acids() -> Self {
        Self {
            residues: STANDARD_AMINO_ACIDS.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn residues(&self) -> &[char] {
        &self.residues
    }

    pub fn contains(&self, residue: char) -> bool {
        self.residues.contains(&residue)
    }

    /// Residues that would be a real change from `original`, in alphabet order.
    pub fn replacements_for(&self, original: char) -> Vec<char> {
        self.residues
            .iter()
            .copied()
            .filter(|&r| r != original)
            .collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::standard_amino_acids()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for residue in &self.residues {
            write!(f, "{}", residue)?;
        }
        Ok(())
    }
}

/// Strictly increasing zero-based positions that are eligible for substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutablePositions {
    indices: Vec<usize>,
}

impl MutablePositions {
    /// Validates `indices` against `sequence`. The input may be unsorted; it is
    /// stored in ascending order.
    pub fn new(sequence: &Sequence, indices: &[usize]) -> Result<Self, SequenceError> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        for window in sorted.windows(2) {
            if window[0] == window[1] {
                return Err(SequenceError::DuplicatePosition(window[0]));
            }
        }
        if let Some(&last) = sorted.last() {
            if last >= sequence.len() {
                return Err(SequenceError::PositionOutOfRange {
                    position: last,
                    length: sequence.len(),
                });
            }
        }
        Ok(Self { indices: sorted })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }
}
