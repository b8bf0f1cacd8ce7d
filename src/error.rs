//! Error types for folder registration and query execution.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, FinderError>;

/// Errors raised by [`DataFinder`](crate::DataFinder).
#[derive(Debug, Error)]
pub enum FinderError {
    /// A single root path was supplied and it is not an existing directory.
    #[error("Root {} does not exist or is not a directory", .path.display())]
    RootNotADirectory {
        /// The rejected root.
        path: PathBuf,
    },

    /// A list of root candidates was supplied and none of them is a directory.
    #[error("None of the provided roots exist or are directories: {candidates:?}")]
    NoValidRoot {
        /// Candidates in the order they were tried.
        candidates: Vec<PathBuf>,
    },

    /// A folder registered with `strict` set is not an existing directory.
    #[error("Folder {} does not exist or is not a directory", .path.display())]
    FolderNotADirectory {
        /// The folder after resolution against the root.
        path: PathBuf,
    },

    /// A regex from the position map failed to compile.
    #[error("Invalid regex pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The file search pattern is not a valid glob.
    #[error("Invalid glob pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl FinderError {
    /// True for root and folder validation failures.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::RootNotADirectory { .. }
                | Self::NoValidRoot { .. }
                | Self::FolderNotADirectory { .. }
        )
    }

    /// True for malformed regex or glob patterns.
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern { .. } | Self::Glob { .. })
    }
}
