use super::line_matcher::{self, FileOutcome, MatchError};
use crate::error::{DirReadError, FileReadError, TreeError};
use crate::pattern::CompiledPattern;
use crate::reporter::ScanReporter;
use crate::tree::WorkingTree;
use crate::types::{TreeEntry, WalkStats};

/// Depth-first traversal of one working tree.
///
/// Unreadable directories and files are reported and skipped; only an error
/// returned by the emit callback stops the walk.
pub struct TreeWalker<'a, F> {
    tree: &'a dyn WorkingTree,
    repository: &'a str,
    pattern: &'a CompiledPattern,
    reporter: &'a mut dyn ScanReporter,
    emit: F,
    stats: WalkStats,
}

impl<'a, F, E> TreeWalker<'a, F>
where
    F: FnMut(&str, Vec<Vec<u8>>) -> Result<(), E>,
{
    pub fn new(
        tree: &'a dyn WorkingTree,
        repository: &'a str,
        pattern: &'a CompiledPattern,
        reporter: &'a mut dyn ScanReporter,
        emit: F,
    ) -> Self {
        Self {
            tree,
            repository,
            pattern,
            reporter,
            emit,
            stats: WalkStats::default(),
        }
    }

    /// Walk from the root, returning per-tree counters
    pub fn walk(mut self) -> Result<WalkStats, E> {
        if let Some(entries) = self.list("") {
            self.walk_entries(entries)?;
        }
        Ok(self.stats)
    }

    fn walk_entries(&mut self, entries: Vec<TreeEntry>) -> Result<(), E> {
        for entry in entries {
            if entry.is_dir() {
                self.reporter.dir_entered(self.repository, &entry.path);
                if let Some(children) = self.list(&entry.path) {
                    self.walk_entries(children)?;
                }
            } else {
                self.scan_file(&entry.path)?;
            }
        }
        Ok(())
    }

    fn list(&mut self, dir: &str) -> Option<Vec<TreeEntry>> {
        let tree = self.tree;
        match tree.read_dir(dir) {
            Ok(entries) => {
                self.stats.dirs += 1;
                Some(entries)
            }
            Err(source) => {
                self.stats.skipped_dirs += 1;
                self.reporter.dir_failed(&DirReadError {
                    repository: self.repository.to_string(),
                    path: dir.to_string(),
                    source,
                });
                None
            }
        }
    }

    fn scan_file(&mut self, path: &str) -> Result<(), E> {
        self.reporter.file_entered(self.repository, path);

        let tree = self.tree;
        let mut reader = match tree.open(path) {
            Ok(reader) => reader,
            Err(source) => {
                self.file_failed(path, source);
                return Ok(());
            }
        };

        let emit = &mut self.emit;
        match line_matcher::scan(&mut reader, self.pattern, |values| emit(path, values)) {
            Ok(FileOutcome::Scanned { matches }) => {
                self.stats.files += 1;
                self.stats.matches += matches;
            }
            Ok(FileOutcome::Binary) => self.reporter.binary_skipped(self.repository, path),
            Err(MatchError::Read(err)) => self.file_failed(path, TreeError::Io(err)),
            Err(MatchError::Emit(err)) => return Err(err),
        }
        Ok(())
    }

    fn file_failed(&mut self, path: &str, source: TreeError) {
        self.stats.skipped_files += 1;
        self.reporter.file_failed(&FileReadError {
            repository: self.repository.to_string(),
            path: path.to_string(),
            source,
        });
    }
}

/// Walk `tree` from its root, emitting `(path, values)` for every match
pub fn walk<F, E>(
    tree: &dyn WorkingTree,
    repository: &str,
    pattern: &CompiledPattern,
    reporter: &mut dyn ScanReporter,
    emit: F,
) -> Result<WalkStats, E>
where
    F: FnMut(&str, Vec<Vec<u8>>) -> Result<(), E>,
{
    TreeWalker::new(tree, repository, pattern, reporter, emit).walk()
}
