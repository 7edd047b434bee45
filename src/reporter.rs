//! Reporting of scan progress and recoverable failures
//!
//! The clone/walk/match pipeline never logs on its own. It hands every
//! notable event to a [`ScanReporter`], and [`LogReporter`] turns them into
//! log lines on stderr.

use crate::error::{CloneError, DirReadError, FileReadError, TreeError};
use crate::types::{RepositoryRef, ScanSummary, WalkStats};
use log::{debug, info, warn};

pub trait ScanReporter {
    fn repository_started(&mut self, _repository: &RepositoryRef) {}
    fn repository_finished(&mut self, _repository: &RepositoryRef, _stats: &WalkStats) {}
    fn clone_failed(&mut self, error: &CloneError);
    fn dir_entered(&mut self, _repository: &str, _path: &str) {}
    fn dir_failed(&mut self, error: &DirReadError);
    fn file_entered(&mut self, _repository: &str, _path: &str) {}
    fn file_failed(&mut self, error: &FileReadError);
    fn binary_skipped(&mut self, _repository: &str, _path: &str) {}
    /// Releasing a working tree failed; its storage may leak until exit
    fn release_failed(&mut self, _repository: &RepositoryRef, _error: &TreeError) {}
    fn run_finished(&mut self, _summary: &ScanSummary) {}
}

/// Reporter backed by the `log` facade
#[derive(Debug, Default)]
pub struct LogReporter;

impl ScanReporter for LogReporter {
    fn repository_started(&mut self, repository: &RepositoryRef) {
        info!("Searching: {}", repository);
    }

    fn repository_finished(&mut self, repository: &RepositoryRef, stats: &WalkStats) {
        debug!(
            "Finished {}: {} files, {} matches, {} skipped",
            repository,
            stats.files,
            stats.matches,
            stats.skipped_dirs + stats.skipped_files
        );
    }

    fn clone_failed(&mut self, error: &CloneError) {
        warn!("Error in {:?}: {}", error.repository, error.cause);
    }

    fn dir_entered(&mut self, repository: &str, path: &str) {
        debug!("[{}] dir: {}", repository, path);
    }

    fn dir_failed(&mut self, error: &DirReadError) {
        warn!("[{}] error finding in {:?}: {}", error.repository, error.path, error.source);
    }

    fn file_entered(&mut self, repository: &str, path: &str) {
        debug!("[{}] file: {}", repository, path);
    }

    fn file_failed(&mut self, error: &FileReadError) {
        warn!("[{}] error finding in {:?}: {}", error.repository, error.path, error.source);
    }

    fn binary_skipped(&mut self, repository: &str, path: &str) {
        debug!("[{}] skipping binary file: {}", repository, path);
    }

    fn release_failed(&mut self, repository: &RepositoryRef, error: &TreeError) {
        warn!("Can not release working tree of {}: {}", repository, error);
    }

    fn run_finished(&mut self, summary: &ScanSummary) {
        info!(
            "Search completed: {} repositories ({} failed), {} files, {} matches",
            summary.repositories, summary.failed_repositories, summary.walk.files, summary.walk.matches
        );
        if summary.walk.skipped_dirs + summary.walk.skipped_files > 0 {
            info!(
                "Skipped {} directories and {} files with errors",
                summary.walk.skipped_dirs, summary.walk.skipped_files
            );
        }
    }
}

/// Reporter that records failures, for tests and callers that want to
/// inspect them after the run
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub clone_failures: Vec<String>,
    pub dir_failures: Vec<String>,
    pub file_failures: Vec<String>,
    pub binary_files: Vec<String>,
}

impl ScanReporter for CollectingReporter {
    fn clone_failed(&mut self, error: &CloneError) {
        self.clone_failures.push(error.repository.clone());
    }

    fn dir_failed(&mut self, error: &DirReadError) {
        self.dir_failures.push(error.path.clone());
    }

    fn file_failed(&mut self, error: &FileReadError) {
        self.file_failures.push(error.path.clone());
    }

    fn binary_skipped(&mut self, _repository: &str, path: &str) {
        self.binary_files.push(path.to_string());
    }
}
