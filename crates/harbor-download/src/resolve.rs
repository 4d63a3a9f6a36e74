//! Collision-free save paths

use std::fs;
use std::path::{Path, PathBuf};

pub const FALLBACK_FILE_NAME: &str = "download";

/// Reduce a suggested name to its final path component.
pub fn sanitize_file_name(file_name: &str) -> String {
    let normalized = file_name.replace('\\', "/");
    let name = Path::new(&normalized)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(FALLBACK_FILE_NAME)
        .trim();

    if name.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// First path in `directory` that does not exist yet, probing
/// `name`, `stem (1).ext`, `stem (2).ext`, ...
///
/// Nothing is cached; every call re-checks the filesystem.
pub fn unique_path(directory: &Path, desired_name: &str) -> PathBuf {
    let name = sanitize_file_name(desired_name);
    let candidate = directory.join(&name);
    if !occupied(&candidate) {
        return candidate;
    }

    let (stem, extension) = split_extension(&name);
    let mut counter: u64 = 1;
    loop {
        let candidate = directory.join(format!("{} ({}){}", stem, counter, extension));
        if !occupied(&candidate) {
            tracing::debug!(
                desired = %name,
                resolved = %candidate.display(),
                "Resolved download name collision"
            );
            return candidate;
        }
        counter += 1;
    }
}

// Dangling symlinks still block the name.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Splits on the last dot; a leading dot is part of the stem.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => name.split_at(index),
        _ => (name, ""),
    }
}
