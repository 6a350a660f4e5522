//! # Corpus Module
//!
//! Lazily enumerates the candidate files of a reference corpus.
//!
//! A corpus is a single directory; it is not walked recursively. Only
//! regular files (following symlinks) become candidates. Whether a
//! candidate is actually an image is decided later, by the decoder.
//!
//! Failure to list the directory itself is fatal. Problems with an
//! individual entry (a dangling symlink, a stat failure) only drop that
//! entry.

use crate::error::MatchError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory of reference images
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
}

impl Corpus {
    /// Open a corpus rooted at `root`.
    ///
    /// Fails if the location cannot be inspected or is not a directory.
    pub fn open(root: &Path) -> Result<Self, MatchError> {
        let metadata = fs::metadata(root).map_err(|e| MatchError::CorpusEnumeration {
            path: root.to_path_buf(),
            source: e,
        })?;

        if !metadata.is_dir() {
            return Err(MatchError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// The corpus directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Iterate over candidate files in directory order.
    ///
    /// Yields an error only when the directory itself cannot be read.
    pub fn candidates(&self) -> Candidates {
        Candidates {
            root: self.root.clone(),
            inner: WalkDir::new(&self.root)
                .min_depth(1)
                .max_depth(1)
                .follow_links(true)
                .into_iter(),
        }
    }
}

/// Iterator over the regular files of a corpus
pub struct Candidates {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl Iterator for Candidates {
    type Item = Result<PathBuf, MatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) if entry.file_type().is_file() => return Some(Ok(entry.into_path())),
                Ok(entry) => {
                    tracing::debug!(path = %entry.path().display(), "Skipping non-file corpus entry");
                }
                Err(err) if err.depth() == 0 => {
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("corpus directory could not be read"));
                    return Some(Err(MatchError::CorpusEnumeration {
                        path: self.root.clone(),
                        source,
                    }));
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Skipping unreadable corpus entry");
                }
            }
        }
    }
}
