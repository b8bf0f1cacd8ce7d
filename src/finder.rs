//! Folder registry and query engine.
//!
//! A [`DataFinder`] owns a root directory and an ordered list of search
//! folders. [`DataFinder::query`] walks every folder with a recursive glob,
//! applies positional regex rules to the segments of each file's path relative
//! to the root, and assembles the surviving rows into a [`ResultTable`] sorted
//! by file name.

use crate::discovery::{GlobDiscoveryConfig, GlobSearch};
use crate::error::{FinderError, Result};
use crate::positions::{PatternCache, PositionRule, RegexPositions};
use crate::table::{Record, ResultTable, INFO};
use crate::utils::{absolutize, path_segments, relative_to_root};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Root specification: one path, or candidates tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootCandidates {
    Single(PathBuf),
    FirstExisting(Vec<PathBuf>),
}

impl From<&str> for RootCandidates {
    fn from(path: &str) -> Self {
        Self::Single(PathBuf::from(path))
    }
}

impl From<String> for RootCandidates {
    fn from(path: String) -> Self {
        Self::Single(PathBuf::from(path))
    }
}

impl From<&Path> for RootCandidates {
    fn from(path: &Path) -> Self {
        Self::Single(path.to_path_buf())
    }
}

impl From<PathBuf> for RootCandidates {
    fn from(path: PathBuf) -> Self {
        Self::Single(path)
    }
}

impl From<&PathBuf> for RootCandidates {
    fn from(path: &PathBuf) -> Self {
        Self::Single(path.clone())
    }
}

impl<P: AsRef<Path>> From<Vec<P>> for RootCandidates {
    fn from(paths: Vec<P>) -> Self {
        Self::FirstExisting(paths.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}

impl<P: AsRef<Path>> From<&[P]> for RootCandidates {
    fn from(paths: &[P]) -> Self {
        Self::FirstExisting(paths.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}

impl<P: AsRef<Path>, const N: usize> From<[P; N]> for RootCandidates {
    fn from(paths: [P; N]) -> Self {
        Self::FirstExisting(paths.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}

impl RootCandidates {
    /// Pick the root this specification resolves to, made absolute.
    fn resolve(&self) -> Result<PathBuf> {
        match self {
            Self::Single(path) => {
                if !path.is_dir() {
                    return Err(FinderError::RootNotADirectory { path: path.clone() });
                }
                Ok(absolutize(path))
            }
            Self::FirstExisting(candidates) => candidates
                .iter()
                .find(|candidate| candidate.is_dir())
                .map(|root| absolutize(root))
                .ok_or_else(|| FinderError::NoValidRoot {
                    candidates: candidates.clone(),
                }),
        }
    }
}

/// Options for [`DataFinder::query`].
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Segment rules keyed by position from the file name outward.
    pub positions: RegexPositions,
    /// Drop files for which any single-pattern position fails to match.
    pub require_match: bool,
    /// Narrate folder entry and per-file outcomes at info level.
    pub verbose: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            positions: RegexPositions::new(),
            require_match: true,
            verbose: false,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(mut self, positions: RegexPositions) -> Self {
        self.positions = positions;
        self
    }

    pub fn require_match(mut self, require_match: bool) -> Self {
        self.require_match = require_match;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Registry of search folders under a root, and the query engine over them.
#[derive(Debug, Clone)]
pub struct DataFinder {
    root: PathBuf,
    folders: Vec<PathBuf>,
}

impl DataFinder {
    /// Configure `root` and register `folders` without strict checking.
    pub fn new<I, P>(folders: I, root: impl Into<RootCandidates>) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut finder = Self::with_root(root)?;
        finder.add_folders(folders, None, false)?;
        Ok(finder)
    }

    /// Finder with a root and no folders.
    pub fn with_root(root: impl Into<RootCandidates>) -> Result<Self> {
        let root = root.into().resolve()?;
        Ok(Self {
            root,
            folders: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registered folders in registration order.
    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    /// Replace the root. The previous root is kept if validation fails.
    pub fn set_root(&mut self, root: impl Into<RootCandidates>) -> Result<()> {
        self.root = root.into().resolve()?;
        Ok(())
    }

    /// Register search folders, optionally setting a new root first.
    ///
    /// Relative folders are resolved against the root. A folder that is not
    /// an existing directory fails the call when `strict` is set (folders
    /// added earlier in the same call stay registered), otherwise it is
    /// skipped with a warning.
    pub fn add_folders<I, P>(
        &mut self,
        folders: I,
        root: Option<RootCandidates>,
        strict: bool,
    ) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        if let Some(root) = root {
            self.set_root(root)?;
        }

        for folder in folders {
            let folder = folder.as_ref();
            let folder = if folder.is_absolute() {
                folder.to_path_buf()
            } else {
                self.root.join(folder)
            };

            if !folder.is_dir() {
                if strict {
                    return Err(FinderError::FolderNotADirectory { path: folder });
                }
                warn!(
                    folder = %folder.display(),
                    "Folder does not exist or is not a directory, skipping"
                );
                continue;
            }

            self.folders.push(folder);
        }

        Ok(())
    }

    /// Find files matching the glob `pattern` in every folder and extract
    /// metadata from their path segments.
    ///
    /// Returns a column-less table when nothing is kept.
    pub fn query(&self, pattern: &str, options: &QueryOptions) -> Result<ResultTable> {
        let verbose = options.verbose;
        if verbose {
            info!(pattern = %pattern, root = %self.root.display(), "Searching for files");
        }

        let search = GlobSearch::new(&GlobDiscoveryConfig::new(pattern))?;
        let mut cache = PatternCache::new();
        let mut rows = Vec::new();

        for folder in &self.folders {
            if verbose {
                info!(
                    folder = %relative_to_root(folder, &self.root).display(),
                    "Entering folder"
                );
            }

            for file in search.walk(folder) {
                let relative = relative_to_root(&file, &self.root);
                let (record, keep) = self.extract(&file, &relative, options, &mut cache)?;

                if verbose {
                    if keep {
                        info!(file = %relative.display(), "Match found");
                    } else {
                        info!(file = %relative.display(), "No match found, skipping file");
                    }
                }

                if keep {
                    rows.push(record);
                }
            }
        }

        if rows.is_empty() {
            if verbose {
                info!("No files found matching the query");
            }
            return Ok(ResultTable::empty());
        }

        rows.sort_by(|a, b| a.filename().cmp(b.filename()));
        Ok(ResultTable::from_records(rows))
    }

    /// Build the row for one file and decide whether it is kept.
    fn extract(
        &self,
        file: &Path,
        relative: &Path,
        options: &QueryOptions,
        cache: &mut PatternCache,
    ) -> Result<(Record, bool)> {
        let mut record = Record::new(file);
        let mut keep = true;

        let segments = path_segments(relative);
        let rules = options.positions.effective(segments.len());

        for (position, segment) in segments.iter().rev().enumerate() {
            let Some(rule) = rules.get(&position) else {
                continue;
            };

            match rule {
                PositionRule::Classifier(candidates) => {
                    for (label, pattern) in candidates {
                        if cache.is_match_start(pattern, segment)? {
                            record.set(INFO, Some(label.clone()));
                            break;
                        }
                    }
                }
                PositionRule::Pattern(pattern) => match cache.named_captures(pattern, segment)? {
                    Some(groups) => {
                        for (name, value) in groups {
                            record.set(&name, value);
                        }
                    }
                    None => {
                        if options.require_match {
                            keep = false;
                        }
                    }
                },
            }
        }

        Ok((record, keep))
    }
}
