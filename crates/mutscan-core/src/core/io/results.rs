use super::traits::ExistingResults;
use crate::core::models::variant::{Variant, VariantError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_KEY_COLUMN: &str = "mutations";

#[derive(Debug, Error)]
pub enum ResultsIndexError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Column '{column}' not found in '{path}'")]
    MissingColumn { path: String, column: String },
    #[error("Row {row} of '{path}' holds an invalid variant: {source}")]
    InvalidVariant {
        path: String,
        row: usize,
        source: VariantError,
    },
}

/// Variant keys that already have computed results, loaded from a CSV export of the
/// results store.
///
/// Keys are canonicalized on load, so rows written with substitutions out of order
/// still match generated variants. Rows for the unmutated reference (an empty key or
/// a `_wt` marker) are ignored.
#[derive(Debug, Clone, Default)]
pub struct ResultsIndex {
    keys: HashSet<String>,
    fingerprint: String,
}

impl ResultsIndex {
    pub fn from_keys<I, S>(keys: I) -> Result<Self, VariantError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical = HashSet::new();
        for key in keys {
            let variant: Variant = key.as_ref().parse()?;
            canonical.insert(variant.key());
        }
        Ok(Self {
            keys: canonical,
            fingerprint: "0".to_string(),
        })
    }

    pub fn from_csv_path(path: &Path, column: &str) -> Result<Self, ResultsIndexError> {
        let path_str = path.to_string_lossy().to_string();
        let bytes = fs::read(path).map_err(|source| ResultsIndexError::Io {
            path: path_str.clone(),
            source,
        })?;

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers = reader.headers().map_err(|source| ResultsIndexError::Csv {
            path: path_str.clone(),
            source,
        })?;
        let column_idx = headers.iter().position(|h| h.trim() == column).ok_or_else(|| {
            ResultsIndexError::MissingColumn {
                path: path_str.clone(),
                column: column.to_string(),
            }
        })?;

        let mut keys = HashSet::new();
        let mut skipped = 0usize;
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|source| ResultsIndexError::Csv {
                path: path_str.clone(),
                source,
            })?;
            let raw = record.get(column_idx).unwrap_or("").trim();
            if raw.is_empty() || raw == "_wt" {
                skipped += 1;
                continue;
            }
            let variant: Variant =
                raw.parse()
                    .map_err(|source| ResultsIndexError::InvalidVariant {
                        path: path_str.clone(),
                        row: row + 1,
                        source,
                    })?;
            keys.insert(variant.key());
        }

        if skipped > 0 {
            warn!(
                "Ignored {} reference rows without substitutions in {:?}",
                skipped, path
            );
        }
        debug!("Loaded {} known variant keys from {:?}", keys.len(), path);

        Ok(Self {
            keys,
            fingerprint: fingerprint(&bytes),
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Short stable hex digest of the source file, used to tie output names to the
    /// exact index they were deduplicated against. `"0"` when built in memory.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl ExistingResults for ResultsIndex {
    fn contains(&self, variant_key: &str) -> bool {
        self.keys.contains(variant_key)
    }
}

/// 64-bit FNV-1a, rendered as 8 hex digits (the upper half folded into the lower).
fn fingerprint(bytes: &[u8]) -> String {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let hash = bytes
        .iter()
        .fold(OFFSET, |acc, &b| (acc ^ b as u64).wrapping_mul(PRIME));
    format!("{:08x}", ((hash >> 32) ^ hash) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_csv_path_loads_and_canonicalizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(
            &path,
            "pdb_fn,mutations,total_score\n2qmt.pdb,K4R,-10.5\n2qmt.pdb,\"K4R,M1A\",-9.0\n2qmt.pdb,_wt,-11.0\n",
        )
        .unwrap();

        let index = ResultsIndex::from_csv_path(&path, DEFAULT_KEY_COLUMN).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains("K4R"));
        assert!(index.contains("M1A,K4R"));
        assert!(!index.contains("M1A"));
        assert_eq!(index.fingerprint().len(), 8);
    }

    #[test]
    fn fingerprint_is_stable_for_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        let c = dir.path().join("c.csv");
        fs::write(&a, "mutations\nK4R\n").unwrap();
        fs::write(&b, "mutations\nK4R\n").unwrap();
        fs::write(&c, "mutations\nK4A\n").unwrap();

        let fa = ResultsIndex::from_csv_path(&a, "mutations").unwrap();
        let fb = ResultsIndex::from_csv_path(&b, "mutations").unwrap();
        let fc = ResultsIndex::from_csv_path(&c, "mutations").unwrap();
        assert_eq!(fa.fingerprint(), fb.fingerprint());
        assert_ne!(fa.fingerprint(), fc.fingerprint());
    }

    #[test]
    fn from_csv_path_reports_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(&path, "variant\nK4R\n").unwrap();
        let err = ResultsIndex::from_csv_path(&path, "mutations").unwrap_err();
        assert!(matches!(err, ResultsIndexError::MissingColumn { .. }));
    }

    #[test]
    fn from_csv_path_reports_invalid_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(&path, "mutations\nK4R\nK4K\n").unwrap();
        let err = ResultsIndex::from_csv_path(&path, "mutations").unwrap_err();
        assert!(matches!(err, ResultsIndexError::InvalidVariant { row: 2, .. }));
    }

    #[test]
    fn from_keys_builds_an_in_memory_index() {
        let index = ResultsIndex::from_keys(["K4R,A1G"]).unwrap();
        assert!(index.contains("A1G,K4R"));
        assert_eq!(index.fingerprint(), "0");
    }
}
