use super::sequence::Sequence;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum VariantError {
    #[error("Variant must contain at least one substitution")]
    Empty,
    #[error("Malformed substitution token '{0}' (expected e.g. 'A12G')")]
    MalformedToken(String),
    #[error("Substitution '{0}' does not change the residue")]
    NoOpSubstitution(String),
    #[error("Position {0} is substituted more than once")]
    DuplicatePosition(usize),
    #[error("Substitution '{token}' is out of range for a sequence of length {length}")]
    OutOfRange { token: String, length: usize },
    #[error("Substitution '{token}' expects residue '{expected}' but the sequence has '{found}'")]
    ResidueMismatch {
        token: String,
        expected: char,
        found: char,
    },
}

/// A single position-specific residue change. `position` is zero-based; the text
/// form uses one-based positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Substitution {
    position: usize,
    original: char,
    replacement: char,
}

impl Substitution {
    pub fn new(original: char, position: usize, replacement: char) -> Result<Self, VariantError> {
        let sub = Self {
            position,
            original,
            replacement,
        };
        if original == replacement {
            return Err(VariantError::NoOpSubstitution(sub.to_string()));
        }
        Ok(sub)
    }

    /// Caller guarantees `original != replacement`.
    pub(crate) fn from_parts(original: char, position: usize, replacement: char) -> Self {
        debug_assert_ne!(original, replacement);
        Self {
            position,
            original,
            replacement,
        }
    }

    pub fn original(&self) -> char {
        self.original
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn replacement(&self) -> char {
        self.replacement
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.original, self.position + 1, self.replacement)
    }
}

impl FromStr for Substitution {
    type Err = VariantError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let malformed = || VariantError::MalformedToken(token.to_string());

        let mut chars = token.chars();
        let original = chars.next().ok_or_else(malformed)?;
        let replacement = chars.next_back().ok_or_else(malformed)?;
        let digits = chars.as_str();

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if original.is_ascii_digit() || replacement.is_ascii_digit() {
            return Err(malformed());
        }
        let one_based: usize = digits.parse().map_err(|_| malformed())?;
        if one_based == 0 {
            return Err(malformed());
        }

        Self::new(original, one_based - 1, replacement)
    }
}

/// An ordered set of substitutions with strictly increasing positions.
///
/// Equality and hashing follow the substitutions, which makes them equivalent to
/// comparing canonical strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variant {
    substitutions: Vec<Substitution>,
}

impl Variant {
    /// Builds a variant from substitutions in any order, sorting them by position.
    pub fn new(mut substitutions: Vec<Substitution>) -> Result<Self, VariantError> {
        if substitutions.is_empty() {
            return Err(VariantError::Empty);
        }
        substitutions.sort_by_key(|s| s.position);
        for pair in substitutions.windows(2) {
            if pair[0].position == pair[1].position {
                return Err(VariantError::DuplicatePosition(pair[0].position + 1));
            }
        }
        Ok(Self { substitutions })
    }

    /// Caller guarantees non-empty input in strictly increasing position order.
    pub(crate) fn from_sorted(substitutions: Vec<Substitution>) -> Self {
        debug_assert!(!substitutions.is_empty());
        debug_assert!(
            substitutions
                .windows(2)
                .all(|p| p[0].position < p[1].position)
        );
        Self { substitutions }
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    /// Number of substitutions ("k").
    pub fn len(&self) -> usize {
        self.substitutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }

    /// The canonical identity key, e.g. `A12G,K40R`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Checks that every substitution lies inside `sequence` and names the
    /// reference residue correctly.
    pub fn validate_against(&self, sequence: &Sequence) -> Result<(), VariantError> {
        for sub in &self.substitutions {
            match sequence.residue(sub.position) {
                None => {
                    return Err(VariantError::OutOfRange {
                        token: sub.to_string(),
                        length: sequence.len(),
                    });
                }
                Some(found) if found != sub.original => {
                    return Err(VariantError::ResidueMismatch {
                        token: sub.to_string(),
                        expected: sub.original,
                        found,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sub) in self.substitutions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", sub)?;
        }
        Ok(())
    }
}

impl FromStr for Variant {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VariantError::Empty);
        }
        let substitutions = s
            .split(',')
            .map(|token| token.trim().parse::<Substitution>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(substitutions)
    }
}
