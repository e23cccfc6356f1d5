use super::traits::{SequenceSource, SequenceSourceError};
use crate::core::models::descriptor::structure_stem;
use crate::core::models::sequence::{Sequence, SequenceError};
use bio::io::fasta;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Record {record}: {message}")]
    Malformed { record: usize, message: String },
    #[error("Record {record}: header has no identifier")]
    EmptyIdentifier { record: usize },
    #[error("Structure '{0}' appears more than once")]
    DuplicateIdentifier(String),
    #[error("Record '{id}' is invalid: {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: SequenceError,
    },
    #[error("File contains no records")]
    NoRecords,
}

/// Reference sequences keyed by structure id, read from FASTA.
///
/// The identifier is the first whitespace-delimited token of each header line. Lookups
/// try the structure id first and then its stem, so `2qmt.pdb` finds a `>2qmt` record.
#[derive(Debug, Clone, Default)]
pub struct FastaSequences {
    order: Vec<String>,
    sequences: HashMap<String, Sequence>,
}

impl FastaSequences {
    pub fn read_from<R: Read>(reader: R) -> Result<Self, FastaError> {
        let mut fasta = Self::default();
        for (idx, result) in fasta::Reader::new(reader).records().enumerate() {
            let record_no = idx + 1;
            let record = result.map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => FastaError::Malformed {
                    record: record_no,
                    message: e.to_string(),
                },
                _ => FastaError::Io(e),
            })?;

            let id = record.id();
            if id.is_empty() {
                return Err(FastaError::EmptyIdentifier { record: record_no });
            }
            if fasta.sequences.contains_key(id) {
                return Err(FastaError::DuplicateIdentifier(id.to_string()));
            }
            let residues =
                std::str::from_utf8(record.seq()).map_err(|e| FastaError::Malformed {
                    record: record_no,
                    message: e.to_string(),
                })?;
            let sequence =
                Sequence::new(residues.trim()).map_err(|source| FastaError::InvalidRecord {
                    id: id.to_string(),
                    source,
                })?;
            fasta.order.push(id.to_string());
            fasta.sequences.insert(id.to_string(), sequence);
        }

        if fasta.order.is_empty() {
            return Err(FastaError::NoRecords);
        }
        Ok(fasta)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, FastaError> {
        Self::read_from(File::open(path)?)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Structure ids in file order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// The only record, when the file holds exactly one.
    pub fn single(&self) -> Option<(&str, &Sequence)> {
        match self.order.as_slice() {
            [id] => self.sequences.get(id).map(|seq| (id.as_str(), seq)),
            _ => None,
        }
    }
}

impl SequenceSource for FastaSequences {
    fn sequence(&self, structure_id: &str) -> Result<&Sequence, SequenceSourceError> {
        self.sequences
            .get(structure_id)
            .or_else(|| self.sequences.get(structure_stem(structure_id)))
            .ok_or_else(|| SequenceSourceError::UnknownStructure(structure_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_from_concatenates_wrapped_sequence_lines() {
        let input = ">2qmt.pdb chain A\nMQYKLILNGK\nTLKGETTTEA\n>1abc.pdb\nACDE\n";
        let fasta = FastaSequences::read_from(Cursor::new(input)).unwrap();
        assert_eq!(fasta.ids(), &["2qmt.pdb".to_string(), "1abc.pdb".to_string()]);
        assert_eq!(fasta.sequence("2qmt.pdb").unwrap().len(), 20);
        assert_eq!(fasta.sequence("1abc.pdb").unwrap().to_string(), "ACDE");
        assert!(fasta.single().is_none());
    }

    #[test]
    fn lookup_falls_back_to_the_structure_stem() {
        let fasta = FastaSequences::read_from(Cursor::new(">2qmt\nMQYK\n")).unwrap();
        assert_eq!(fasta.sequence("2qmt.pdb").unwrap().len(), 4);
        assert_eq!(
            fasta.sequence("1abc.pdb"),
            Err(SequenceSourceError::UnknownStructure("1abc.pdb".to_string()))
        );
    }

    #[test]
    fn single_returns_the_only_record() {
        let fasta = FastaSequences::read_from(Cursor::new(">gb1\nMQYK\n")).unwrap();
        let (id, seq) = fasta.single().unwrap();
        assert_eq!(id, "gb1");
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn read_from_rejects_malformed_input() {
        assert!(matches!(
            FastaSequences::read_from(Cursor::new("ACDE\n")),
            Err(FastaError::Malformed { record: 1, .. })
        ));
        assert!(matches!(
            FastaSequences::read_from(Cursor::new(">a\nAC\n>a\nDE\n")),
            Err(FastaError::DuplicateIdentifier(id)) if id == "a"
        ));
        assert!(matches!(
            FastaSequences::read_from(Cursor::new(">a\n>b\nDE\n")),
            Err(FastaError::InvalidRecord { .. })
        ));
        assert!(matches!(
            FastaSequences::read_from(Cursor::new("")),
            Err(FastaError::NoRecords)
        ));
    }

    #[test]
    fn headers_without_identifier_are_rejected_by_record_number() {
        assert!(matches!(
            FastaSequences::read_from(Cursor::new(">a\nAC\n>\nDE\n")),
            Err(FastaError::EmptyIdentifier { record: 2 })
        ));
    }

    #[test]
    fn read_from_path_reads_a_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.fasta");
        std::fs::write(&path, ">2qmt desc\nMQYK\nLILN\n").unwrap();
        let fasta = FastaSequences::read_from_path(&path).unwrap();
        assert_eq!(fasta.sequence("2qmt").unwrap().to_string(), "MQYKLILN");
    }

    #[test]
    fn unknown_structure_is_an_error() {
        let fasta = FastaSequences::read_from(Cursor::new(">a\nAC\n")).unwrap();
        assert!(fasta.sequence("b").is_err());
    }
}
