use mutscan::workflows::package::{BATCH_DIR_NAME, BatchArchiver};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use tracing::{debug, info};

const ZSTD_LEVEL: i32 = 3;

/// Packs the batch directory as `args/` inside a zstd-compressed tar archive.
pub struct TarZstdArchiver;

impl BatchArchiver for TarZstdArchiver {
    fn archive(&self, batch_dir: &Path, archive_path: &Path) -> io::Result<()> {
        create_archive(batch_dir, BATCH_DIR_NAME, archive_path)
    }
}

/// Bundles `source_dir` into a zstd-compressed tar archive at `archive_path`, storing
/// its entries under `dir_name/`. The archive must not exist yet, and a half-written
/// archive is removed when packing fails.
pub fn create_archive(source_dir: &Path, dir_name: &str, archive_path: &Path) -> io::Result<()> {
    debug!(
        "Archiving {:?} as '{}/' into {:?}",
        source_dir, dir_name, archive_path
    );
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(archive_path)?;

    let packed = write_tar_zst(file, source_dir, dir_name);
    if packed.is_err() {
        let _ = fs::remove_file(archive_path);
    }
    packed?;

    info!("Wrote archive {:?}", archive_path);
    Ok(())
}

fn write_tar_zst(file: fs::File, source_dir: &Path, dir_name: &str) -> io::Result<()> {
    let encoder = zstd::stream::write::Encoder::new(file, ZSTD_LEVEL)?;
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(dir_name, source_dir)?;
    let encoder = builder.into_inner()?;
    encoder.finish()?;
    Ok(())
}
