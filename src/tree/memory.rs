use super::WorkingTree;
use crate::error::TreeError;
use crate::types::TreeEntry;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::{self, BufRead, Cursor};

/// Working tree held entirely in memory.
///
/// Directories are implied by the files added to them. Paths can be marked
/// unreadable to simulate permission or corruption failures.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    unreadable: HashSet<String>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        let mut dirs = BTreeSet::new();
        dirs.insert(String::new());
        Self {
            files: BTreeMap::new(),
            dirs,
            unreadable: HashSet::new(),
        }
    }

    pub fn with_file(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn with_dir(mut self, path: &str) -> Self {
        self.add_dir(path);
        self
    }

    /// Make `read_dir`/`open` on `path` fail
    pub fn with_unreadable(mut self, path: &str) -> Self {
        self.unreadable.insert(path.to_string());
        self
    }

    pub fn add_file(&mut self, path: &str, content: impl AsRef<[u8]>) {
        if let Some((parent, _)) = path.rsplit_once('/') {
            self.add_dir(parent);
        }
        self.files.insert(path.to_string(), content.as_ref().to_vec());
    }

    pub fn add_dir(&mut self, path: &str) {
        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = super::join_path(&current, part);
            self.dirs.insert(current.clone());
        }
    }

    fn check_readable(&self, path: &str) -> Result<(), TreeError> {
        if self.unreadable.contains(path) {
            return Err(TreeError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path),
            )));
        }
        Ok(())
    }
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

impl WorkingTree for MemoryTree {
    fn read_dir(&self, dir: &str) -> Result<Vec<TreeEntry>, TreeError> {
        self.check_readable(dir)?;

        if !self.dirs.contains(dir) {
            return Err(if self.files.contains_key(dir) {
                TreeError::NotADirectory(dir.to_string())
            } else {
                TreeError::NotFound(dir.to_string())
            });
        }

        let subdirs = self
            .dirs
            .iter()
            .filter(|d| !d.is_empty() && parent_of(d) == dir)
            .map(|d| TreeEntry::dir(d.clone()));
        let files = self
            .files
            .keys()
            .filter(|f| parent_of(f) == dir)
            .map(|f| TreeEntry::file(f.clone()));

        let mut entries: Vec<TreeEntry> = subdirs.chain(files).collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn open(&self, path: &str) -> Result<Box<dyn BufRead + '_>, TreeError> {
        self.check_readable(path)?;

        match self.files.get(path) {
            Some(content) => Ok(Box::new(Cursor::new(content.as_slice()))),
            None if self.dirs.contains(path) => Err(TreeError::NotAFile(path.to_string())),
            None => Err(TreeError::NotFound(path.to_string())),
        }
    }

    fn release(self: Box<Self>) -> Result<(), TreeError> {
        Ok(())
    }
}
