//! Object key derivation
//!
//! Maps a local file path under the upload root to the key it is stored
//! under. Keys always use `/` between components, whatever the platform
//! separator is.

use std::fmt;
use std::path::{Component, Path};

use crate::error::{Error, Result};

/// Key of an object within a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Derive the key for `file`, found while walking `root`
    ///
    /// When `file` is the root itself (the root is a plain file), the key is
    /// its file name. Otherwise the key is the path of `file` relative to
    /// `root`. A configured `prefix` is joined in front with a `/`.
    pub fn derive(root: &Path, file: &Path, prefix: Option<&str>) -> Result<Self> {
        let relative = if file == root {
            file.file_name()
                .map(Path::new)
                .ok_or_else(|| invalid(file, "path has no file name"))?
        } else {
            file.strip_prefix(root)
                .map_err(|_| invalid(file, "path is outside the upload root"))?
        };

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(
                    part.to_str()
                        .ok_or_else(|| invalid(file, "path is not valid UTF-8"))?,
                ),
                Component::RootDir | Component::CurDir => {}
                Component::Prefix(_) | Component::ParentDir => {
                    return Err(invalid(file, "path cannot be expressed as a key"));
                }
            }
        }

        if parts.is_empty() {
            return Err(invalid(file, "path has no file name"));
        }

        let key = parts.join("/");
        Ok(match prefix {
            Some(prefix) => Self(format!("{prefix}/{key}")),
            None => Self(key),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(path: &Path, reason: &str) -> Error {
    Error::InvalidPath(format!("{}: {reason}", path.display()))
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}
