//! Filesystem walker
//!
//! Yields every regular file under the upload root, depth first. Directories
//! are expanded with an explicit stack, so deep trees do not grow the call
//! stack. Children are visited in whatever order the filesystem returns them.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{Error, Result};

/// A directory or entry that could not be read during the walk
#[derive(Error, Debug)]
#[error("{}: {source}", path.display())]
pub struct WalkError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl WalkError {
    fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// What the upload root turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    File,
    Directory,
}

/// Pending work on the walk stack
#[derive(Debug)]
enum Entry {
    /// A path still to be inspected
    Visit(PathBuf),
    /// End of a directory's subtree, identified by its canonical path
    Leave(PathBuf),
}

/// Depth-first iterator over the regular files under a root path
///
/// Symbolic links are followed. A directory that resolves to one of its own
/// ancestors on the current descent path is a cycle and is not expanded.
/// The same directory reached through two unrelated paths is walked under
/// both.
#[derive(Debug)]
pub struct FileWalker {
    kind: RootKind,
    stack: Vec<Entry>,
    ancestors: HashSet<PathBuf>,
}

impl FileWalker {
    /// Classify `root` and prepare the walk
    ///
    /// Fails with [`Error::InvalidPath`] when the root is neither a regular
    /// file nor a directory, cannot be inspected at all, or is a directory
    /// that cannot be listed.
    pub fn new(root: &Path) -> Result<Self> {
        let unreadable = |e: std::io::Error| {
            Error::InvalidPath(format!("Error reading file: {}: {e}", root.display()))
        };
        let metadata = fs::metadata(root).map_err(unreadable)?;

        let kind = if metadata.is_dir() {
            fs::read_dir(root).map_err(unreadable)?;
            RootKind::Directory
        } else if metadata.is_file() {
            RootKind::File
        } else {
            return Err(Error::InvalidPath(format!(
                "Error reading file: {}",
                root.display()
            )));
        };

        Ok(Self {
            kind,
            stack: vec![Entry::Visit(root.to_path_buf())],
            ancestors: HashSet::new(),
        })
    }

    pub fn kind(&self) -> RootKind {
        self.kind
    }

    fn descend(&mut self, dir: &Path) -> std::result::Result<(), WalkError> {
        let canonical = fs::canonicalize(dir).map_err(|e| WalkError::new(dir, e))?;
        if self.ancestors.contains(&canonical) {
            tracing::warn!(path = %dir.display(), "Directory cycle detected, skipping");
            return Ok(());
        }

        let mut children = Vec::new();
        let mut first_error = None;
        for entry in fs::read_dir(dir).map_err(|e| WalkError::new(dir, e))? {
            match entry {
                Ok(entry) => children.push(Entry::Visit(entry.path())),
                Err(e) => {
                    first_error.get_or_insert(WalkError::new(dir, e));
                }
            }
        }

        self.ancestors.insert(canonical.clone());
        self.stack.push(Entry::Leave(canonical));
        // Reversed so entries pop off the stack in enumeration order
        self.stack.extend(children.into_iter().rev());

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Iterator for FileWalker {
    type Item = std::result::Result<PathBuf, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(entry) = self.stack.pop() {
            let path = match entry {
                Entry::Visit(path) => path,
                Entry::Leave(canonical) => {
                    self.ancestors.remove(&canonical);
                    continue;
                }
            };
            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => return Some(Err(WalkError::new(path, e))),
            };

            if metadata.is_dir() {
                if let Err(e) = self.descend(&path) {
                    return Some(Err(e));
                }
            } else if metadata.is_file() {
                return Some(Ok(path));
            } else {
                tracing::warn!(path = %path.display(), "Skipping special file");
            }
        }
        None
    }
}
