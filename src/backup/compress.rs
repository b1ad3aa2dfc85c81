use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::error::AppError;

/// Gzip `path` in place: writes `<path>.gz` and removes the original
///
/// An existing `<path>.gz` is overwritten.
pub(crate) fn gzip_in_place(path: &Path) -> Result<PathBuf, AppError> {
    let mut target = path.as_os_str().to_owned();
    target.push(".gz");
    let target = PathBuf::from(target);

    let input = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open {}", path.display()), e))?;
    if let Err(e) = write_gzip(input, &target) {
        // A truncated archive would otherwise count as the newest backup
        if let Err(rm) = fs::remove_file(&target) {
            tracing::warn!("Failed to remove partial archive {}: {}", target.display(), rm);
        }
        return Err(e);
    }

    fs::remove_file(path)
        .map_err(|e| AppError::io(format!("Failed to remove {}", path.display()), e))?;
    Ok(target)
}

fn write_gzip<R: Read>(input: R, target: &Path) -> Result<(), AppError> {
    let output = File::create(target)
        .map_err(|e| AppError::io(format!("Failed to create {}", target.display()), e))?;

    let mut reader = BufReader::new(input);
    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    let write_err =
        |e: io::Error| AppError::io(format!("Failed to compress into {}", target.display()), e);
    io::copy(&mut reader, &mut encoder).map_err(write_err)?;
    let writer = encoder.finish().map_err(write_err)?;
    writer
        .into_inner()
        .map_err(|e| write_err(e.into_error()))?
        .sync_all()
        .map_err(write_err)
}
