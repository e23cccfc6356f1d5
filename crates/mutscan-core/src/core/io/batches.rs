use super::variant_list::{VariantListError, VariantListFile};
use crate::core::models::batch::JobBatch;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes every batch to `{dir}/{index}.txt`, creating `dir`, which must not exist yet.
/// Returns the written paths in job order. On failure `dir` is removed again.
pub fn write_batches(dir: &Path, batches: &[JobBatch]) -> Result<Vec<PathBuf>, VariantListError> {
    if dir.exists() {
        return Err(VariantListError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("batch directory {:?} already exists", dir),
        )));
    }
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(batches.len());
    for batch in batches {
        let path = dir.join(batch.file_name());
        if let Err(e) = VariantListFile::write_to_new_path(&batch.descriptors, &path) {
            let _ = fs::remove_dir_all(dir);
            return Err(e);
        }
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::descriptor::VariantDescriptor;

    fn batch(index: usize, lines: &[&str]) -> JobBatch {
        JobBatch::new(
            index,
            lines
                .iter()
                .map(|l| l.parse::<VariantDescriptor>().unwrap())
                .collect(),
        )
    }

    #[test]
    fn write_batches_numbers_files_by_job_index() {
        let dir = tempfile::tempdir().unwrap();
        let args = dir.path().join("args");
        let batches = vec![batch(0, &["a.pdb M1A", "a.pdb M1C"]), batch(1, &["a.pdb Q2W"])];

        let written = write_batches(&args, &batches).unwrap();
        assert_eq!(written, vec![args.join("0.txt"), args.join("1.txt")]);
        assert_eq!(
            fs::read_to_string(args.join("0.txt")).unwrap(),
            "a.pdb M1A\na.pdb M1C\n"
        );
        assert_eq!(fs::read_to_string(args.join("1.txt")).unwrap(), "a.pdb Q2W\n");
    }

    #[test]
    fn write_batches_refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_batches(dir.path(), &[batch(0, &["a.pdb M1A"])]).unwrap_err();
        assert!(matches!(err, VariantListError::Io(e) if e.kind() == io::ErrorKind::AlreadyExists));
    }

    #[test]
    fn failed_write_removes_the_batch_directory() {
        let dir = tempfile::tempdir().unwrap();
        let args = dir.path().join("args");
        let batches = vec![batch(0, &["a.pdb M1A"]), batch(0, &["a.pdb Q2W"])];

        assert!(write_batches(&args, &batches).is_err());
        assert!(!args.exists());
    }
}
