//! Read-only views over one repository snapshot

pub mod git;
pub mod memory;

pub use git::GitTree;
pub use memory::MemoryTree;

use crate::error::TreeError;
use crate::types::TreeEntry;
use std::io::BufRead;

/// A read-only working tree.
///
/// Paths are relative to the root and use `/` as separator; the root
/// itself is the empty string.
pub trait WorkingTree {
    /// List the direct children of `dir`, sorted by name
    fn read_dir(&self, dir: &str) -> Result<Vec<TreeEntry>, TreeError>;

    /// Open a file for line-by-line reading
    fn open(&self, path: &str) -> Result<Box<dyn BufRead + '_>, TreeError>;

    /// Release any transient storage held by the tree
    fn release(self: Box<Self>) -> Result<(), TreeError>;
}

/// Join a directory path and a child name
pub(crate) fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}
