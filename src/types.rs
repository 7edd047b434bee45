use serde::Deserialize;
use std::fmt;

/// A repository to scan, as returned by the lister.
///
/// The clone URL doubles as the display name in the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct RepositoryRef {
    #[serde(rename = "clone_url")]
    pub url: String,
}

impl RepositoryRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn name(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Kind of an entry inside a working tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

/// A single directory listing entry, path relative to the tree root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn dir(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::Dir }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::File }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// One match, ready to be written by the output sink.
///
/// `values` holds either the whole line (pattern without groups) or one
/// entry per capture group, excluding group 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub repository: String,
    pub file: String,
    pub values: Vec<Vec<u8>>,
}

/// Counters for one repository walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub dirs: usize,
    pub files: usize,
    pub matches: usize,
    pub skipped_dirs: usize,
    pub skipped_files: usize,
}

impl WalkStats {
    pub fn absorb(&mut self, other: WalkStats) {
        self.dirs += other.dirs;
        self.files += other.files;
        self.matches += other.matches;
        self.skipped_dirs += other.skipped_dirs;
        self.skipped_files += other.skipped_files;
    }
}

/// Counters for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub repositories: usize,
    pub failed_repositories: usize,
    pub walk: WalkStats,
}
