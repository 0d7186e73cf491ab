use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::error::AvrcError;

pub const FLATTEN_EXTENSION: &str = "csv";

/// Unpacks into `output_dir`, then moves the CSV files of `nested_folder` up
/// one level and removes the folder. Returns the moved paths.
pub fn extract_tar_gz(
    archive_path: &Path,
    output_dir: &Path,
    nested_folder: Option<&str>,
) -> Result<Vec<PathBuf>, AvrcError> {
    let fail = |message: String| AvrcError::ArchiveExtraction {
        path: archive_path.to_path_buf(),
        message,
    };

    let file = File::open(archive_path).map_err(|err| fail(format!("open: {err}")))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive
        .unpack(output_dir)
        .map_err(|err| fail(format!("unpack into {}: {err}", output_dir.display())))?;
    debug!(archive = %archive_path.display(), "archive unpacked");

    let Some(folder) = nested_folder else {
        return Ok(Vec::new());
    };
    let nested_dir = output_dir.join(folder);
    if !nested_dir.is_dir() {
        debug!(folder, "nested folder absent, nothing to flatten");
        return Ok(Vec::new());
    }

    let flattened = flatten_dir(&nested_dir, output_dir).map_err(fail)?;
    fs::remove_dir_all(&nested_dir)
        .map_err(|err| fail(format!("remove {}: {err}", nested_dir.display())))?;
    debug!(folder, moved = flattened.len(), "nested folder flattened");
    Ok(flattened)
}

fn flatten_dir(nested_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries =
        fs::read_dir(nested_dir).map_err(|err| format!("read {}: {err}", nested_dir.display()))?;
    let mut moved = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| err.to_string())?;
        let path = entry.path();
        if !path.is_file() || !has_extension(&path, FLATTEN_EXTENSION) {
            continue;
        }
        let target = output_dir.join(entry.file_name());
        move_file(&path, &target).map_err(|err| format!("move {}: {err}", path.display()))?;
        moved.push(target);
    }
    moved.sort();
    Ok(moved)
}

fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if to.exists() {
        fs::remove_file(to)?;
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|value| value.to_str())
        .map(|value| value.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
