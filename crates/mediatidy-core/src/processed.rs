use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved paths written by moves earlier in the same run. A file that was
/// moved into a directory the walk has not reached yet is found again there;
/// this set lets the walk recognise and skip it.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    paths: HashSet<PathBuf>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &Path) -> bool {
        self.paths.insert(resolve(path))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(&resolve(path))
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
