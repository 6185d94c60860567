//! Data-file search path.
//!
//! Relative image file names stored in a document are resolved against an
//! ordered list of directories, the same way the host library resolves
//! `FileName` properties. The lookup order is:
//!
//! 1. the name as given (absolute, or relative to the working directory);
//! 2. each search directory joined with the name;
//! 3. each search directory joined with the bare file name component.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Ordered list of directories searched for data files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFilePathList {
    paths: Vec<PathBuf>,
}

impl DataFilePathList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a platform path list (`:` or `;` separated) from an
    /// environment variable. Returns `None` if the variable is unset.
    pub fn from_env(var: impl AsRef<OsStr>) -> Option<Self> {
        let value = std::env::var_os(var)?;
        Some(Self {
            paths: std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
        })
    }

    /// Appends a directory.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Number of directories.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterates the directories in search order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Resolves `name` to an existing file.
    ///
    /// Returns `None` for an empty name or when no candidate exists.
    pub fn find_data_file(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        let path = Path::new(name);
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        for dir in &self.paths {
            let candidate = dir.join(path);
            trace!("searching {}", candidate.display());
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        let simple = path.file_name()?;
        if simple == path.as_os_str() {
            return None;
        }
        self.paths
            .iter()
            .map(|dir| dir.join(simple))
            .find(|candidate| candidate.is_file())
    }
}

impl Extend<PathBuf> for DataFilePathList {
    fn extend<I: IntoIterator<Item = PathBuf>>(&mut self, iter: I) {
        self.paths.extend(iter);
    }
}

impl IntoIterator for DataFilePathList {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl FromIterator<PathBuf> for DataFilePathList {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_in_search_dirs() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        std::fs::write(second.path().join("brick.png"), b"x").unwrap();

        let list: DataFilePathList = [first.path().to_path_buf(), second.path().to_path_buf()]
            .into_iter()
            .collect();
        assert_eq!(list.find_data_file("brick.png"), Some(second.path().join("brick.png")));
        assert_eq!(list.find_data_file("missing.png"), None);
        assert_eq!(list.find_data_file(""), None);
    }

    #[test]
    fn test_find_by_simple_name() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("wall.png"), b"x").unwrap();

        let mut list = DataFilePathList::new();
        list.push(dir.path());
        let found = list.find_data_file("textures/old/wall.png");
        assert_eq!(found, Some(dir.path().join("wall.png")));
    }

    #[test]
    fn test_existing_path_wins() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("direct.png");
        std::fs::write(&file, b"x").unwrap();

        let list = DataFilePathList::new();
        assert_eq!(list.find_data_file(file.to_str().unwrap()), Some(file));
    }
}
