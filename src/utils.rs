//! Path helpers shared across modules

use std::path::{Component, Path, PathBuf};

/// Extension of the final component including the leading dot, or an empty
/// string when there is none.
///
/// Dot-files such as `.bashrc` have no suffix, and a trailing dot (`file.`)
/// yields an empty suffix as well.
pub fn path_suffix(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy()),
        _ => String::new(),
    }
}

/// Base name of the path as a string (lossy for non UTF-8 names).
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Path of `path` relative to `root`.
///
/// Paths that do not live under `root` are returned without their prefix and
/// root components, so they still split into meaningful segments.
pub fn relative_to_root(path: &Path, root: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => path
            .components()
            .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
            .collect(),
    }
}

/// Ordered segments of a relative path: directory names followed by the
/// file name.
pub fn path_segments(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir | Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect()
}

/// Make a path absolute against the working directory without touching the
/// filesystem beyond reading the current directory.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
