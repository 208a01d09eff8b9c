//! Input discovery: find .pptx files below a directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "pptx";

/// Find presentation files in `dir`, sorted by path.
///
/// Files under `output_dir`, hidden directories, symlinked directories and
/// Office lock files (`~$name.pptx`) are skipped.
pub fn find_presentations(dir: &Path, output_dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let excluded = fs::canonicalize(output_dir).ok();
    let mut files = Vec::new();
    collect(dir, excluded.as_deref(), recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect(
    dir: &Path,
    excluded: Option<&Path>,
    recursive: bool,
    files: &mut Vec<PathBuf>,
) -> io::Result<()> {
    if let (Some(excluded), Ok(canonical)) = (excluded, fs::canonicalize(dir)) {
        if canonical.starts_with(excluded) {
            return Ok(());
        }
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        // Symlinked directories are never followed.
        let is_file = file_type.is_file() || (file_type.is_symlink() && path.is_file());

        if file_type.is_dir() {
            if recursive && !name.starts_with('.') {
                collect(&path, excluded, recursive, files)?;
            }
        } else if is_file && is_presentation(&path) && !name.starts_with("~$") {
            files.push(path);
        }
    }

    Ok(())
}

fn is_presentation(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(EXTENSION))
}
