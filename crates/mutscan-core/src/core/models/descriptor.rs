use super::variant::{Variant, VariantError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DescriptorError {
    #[error("Expected '<structure-id> <variant>' but found '{0}'")]
    MissingField(String),
    #[error("Unexpected trailing content in '{0}'")]
    TrailingContent(String),
    #[error("Invalid variant: {0}")]
    Variant(#[from] VariantError),
}

/// One line of a variant list: the structure a variant applies to and the variant itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantDescriptor {
    pub structure_id: String,
    pub variant: Variant,
}

impl VariantDescriptor {
    pub fn new(structure_id: impl Into<String>, variant: Variant) -> Self {
        Self {
            structure_id: structure_id.into(),
            variant,
        }
    }
}

impl fmt::Display for VariantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.structure_id, self.variant)
    }
}

impl FromStr for VariantDescriptor {
    type Err = DescriptorError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_whitespace();
        let (Some(structure_id), Some(variant)) = (fields.next(), fields.next()) else {
            return Err(DescriptorError::MissingField(line.to_string()));
        };
        if fields.next().is_some() {
            return Err(DescriptorError::TrailingContent(line.to_string()));
        }
        Ok(Self {
            structure_id: structure_id.to_string(),
            variant: variant.parse()?,
        })
    }
}

/// File stem used in output names, e.g. `2qmt` for `2qmt.pdb`.
pub fn structure_stem(structure_id: &str) -> &str {
    Path::new(structure_id)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(structure_id)
}
