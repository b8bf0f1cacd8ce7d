//! Recursive glob enumeration under a single folder.
//!
//! A search pattern such as `*.tif` is applied at every depth below the folder,
//! the same way a recursive glob would: it is compiled as `**/<pattern>` and
//! matched against each file's path relative to the folder. `*` and `?` never
//! cross a path separator.

use crate::error::{FinderError, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Configuration for glob discovery.
#[derive(Debug, Clone)]
pub struct GlobDiscoveryConfig {
    /// Glob applied at any depth below the folder.
    pub pattern: String,

    /// Descend into symlinked directories. Off by default; symlinks to
    /// files are reported either way.
    pub follow_links: bool,

    /// Case-insensitive matching. Defaults to the platform convention
    /// (insensitive on Windows, sensitive elsewhere).
    pub case_insensitive: bool,
}

impl GlobDiscoveryConfig {
    /// Create a config for `pattern` with platform defaults.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            follow_links: false,
            case_insensitive: cfg!(windows),
        }
    }

    /// Compile the recursive matcher for this pattern.
    fn compile(&self) -> Result<GlobMatcher> {
        let pattern = self.pattern.trim_start_matches(['/', '\\']);
        let recursive = format!("**/{}", pattern);
        let glob = GlobBuilder::new(&recursive)
            .literal_separator(true)
            .case_insensitive(self.case_insensitive)
            .build()
            .map_err(|source| FinderError::Glob {
                pattern: self.pattern.clone(),
                source,
            })?;
        Ok(glob.compile_matcher())
    }
}

/// A compiled glob search, reusable across folders.
#[derive(Debug, Clone)]
pub struct GlobSearch {
    matcher: GlobMatcher,
    follow_links: bool,
}

impl GlobSearch {
    /// Compile `config`. Fails only when the glob pattern is invalid.
    pub fn new(config: &GlobDiscoveryConfig) -> Result<Self> {
        Ok(Self {
            matcher: config.compile()?,
            follow_links: config.follow_links,
        })
    }

    /// Files below `folder` whose relative path matches. A folder that no
    /// longer exists yields nothing.
    pub fn walk(&self, folder: &Path) -> GlobDiscoveryIterator<'_> {
        let walker = WalkDir::new(folder)
            .min_depth(1)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter();

        GlobDiscoveryIterator {
            folder: folder.to_path_buf(),
            walker,
            matcher: &self.matcher,
        }
    }
}

/// Iterator over files below one folder whose relative path matches the glob.
///
/// Entries are visited in file-name order so repeated runs over an unchanged
/// tree yield the same sequence.
pub struct GlobDiscoveryIterator<'a> {
    folder: PathBuf,
    walker: walkdir::IntoIter,
    matcher: &'a GlobMatcher,
}

impl GlobDiscoveryIterator<'_> {
    fn matches(&self, path: &Path) -> bool {
        match path.strip_prefix(&self.folder) {
            Ok(relative) => self.matcher.is_match(relative),
            Err(_) => false,
        }
    }
}

/// Regular files, and symlinks whose target is a regular file.
fn is_file_entry(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

impl Iterator for GlobDiscoveryIterator<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.walker.next()? {
                Ok(entry) => {
                    if !is_file_entry(&entry) {
                        continue;
                    }
                    let path = entry.path();
                    if self.matches(path) {
                        return Some(path.to_path_buf());
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        folder = %self.folder.display(),
                        error = %e,
                        "Error walking directory"
                    );
                }
            }
        }
    }
}
