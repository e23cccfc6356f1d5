use crate::core::models::descriptor::{DescriptorError, VariantDescriptor};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VariantListError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: DescriptorError,
    },
    #[error("Failed to read variant list '{path}': {source}", path = path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<VariantListError>,
    },
}

/// Master variant lists: one `<structure-id> <variant>` descriptor per line.
pub struct VariantListFile;

impl VariantListFile {
    /// Reads descriptors from `reader`, skipping blank lines.
    pub fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<Vec<VariantDescriptor>, VariantListError> {
        let mut descriptors = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let descriptor = trimmed
                .parse::<VariantDescriptor>()
                .map_err(|source| VariantListError::Parse {
                    line: idx + 1,
                    source,
                })?;
            descriptors.push(descriptor);
        }
        Ok(descriptors)
    }

    pub fn write_to(
        descriptors: &[VariantDescriptor],
        writer: &mut impl Write,
    ) -> Result<(), VariantListError> {
        for descriptor in descriptors {
            writeln!(writer, "{}", descriptor)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<VariantDescriptor>, VariantListError> {
        let path = path.as_ref();
        let wrap = |source: VariantListError| VariantListError::File {
            path: path.to_path_buf(),
            source: Box::new(source),
        };
        let file = File::open(path).map_err(|e| wrap(e.into()))?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader).map_err(wrap)
    }

    /// Reads several master lists and concatenates them in the given order.
    pub fn read_from_paths<P: AsRef<Path>>(
        paths: &[P],
    ) -> Result<Vec<VariantDescriptor>, VariantListError> {
        let mut all = Vec::new();
        for path in paths {
            all.extend(Self::read_from_path(path)?);
        }
        Ok(all)
    }

    /// Writes to a path that must not exist yet.
    pub fn write_to_new_path<P: AsRef<Path>>(
        descriptors: &[VariantDescriptor],
        path: P,
    ) -> Result<(), VariantListError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(descriptors, &mut writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_from_skips_blank_lines() {
        let input = "a.pdb M1A\n\n  \na.pdb M1C,Q2W\n";
        let descriptors = VariantListFile::read_from(&mut Cursor::new(input)).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].variant.key(), "M1C,Q2W");
    }

    #[test]
    fn read_from_reports_the_offending_line_number() {
        let input = "a.pdb M1A\na.pdb M1M\n";
        let err = VariantListFile::read_from(&mut Cursor::new(input)).unwrap_err();
        assert!(matches!(err, VariantListError::Parse { line: 2, .. }));
    }

    #[test]
    fn write_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        let descriptors: Vec<VariantDescriptor> = ["b.pdb K4R", "a.pdb M1A,K4R"]
            .iter()
            .map(|l| l.parse().unwrap())
            .collect();

        VariantListFile::write_to_new_path(&descriptors, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "b.pdb K4R\na.pdb M1A,K4R\n");
        assert_eq!(VariantListFile::read_from_path(&path).unwrap(), descriptors);
    }

    #[test]
    fn write_to_new_path_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "keep me\n").unwrap();

        let err = VariantListFile::write_to_new_path(&[], &path).unwrap_err();
        assert!(matches!(err, VariantListError::Io(e) if e.kind() == io::ErrorKind::AlreadyExists));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me\n");
    }

    #[test]
    fn read_from_paths_concatenates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("1.txt");
        let second = dir.path().join("2.txt");
        std::fs::write(&first, "a.pdb M1A\n").unwrap();
        std::fs::write(&second, "b.pdb K4R\nb.pdb K4A\n").unwrap();

        let all = VariantListFile::read_from_paths(&[&first, &second]).unwrap();
        let ids: Vec<&str> = all.iter().map(|d| d.structure_id.as_str()).collect();
        assert_eq!(ids, vec!["a.pdb", "b.pdb", "b.pdb"]);
    }

    #[test]
    fn read_from_path_names_the_missing_file() {
        let err = VariantListFile::read_from_path("/nonexistent/list.txt").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/list.txt"));
    }
}
