//! Sequential clone → walk → emit driver
//!
//! Repositories are processed strictly in listing order, one at a time.
//! Each working tree is released before the next clone starts, so at most
//! one repository's snapshot is held at any moment.

use crate::display::CsvSink;
use crate::error::FatalError;
use crate::pattern::CompiledPattern;
use crate::reporter::ScanReporter;
use crate::searchers;
use crate::services::{Cloner, RepositoryLister};
use crate::types::{MatchRecord, RepositoryRef, ScanSummary};
use std::io::Write;

pub struct ScanCoordinator<'a, W: Write> {
    pattern: &'a CompiledPattern,
    cloner: &'a dyn Cloner,
    reporter: &'a mut dyn ScanReporter,
    out: W,
}

impl<'a, W: Write> ScanCoordinator<'a, W> {
    pub fn new(
        pattern: &'a CompiledPattern,
        cloner: &'a dyn Cloner,
        reporter: &'a mut dyn ScanReporter,
        out: W,
    ) -> Self {
        Self {
            pattern,
            cloner,
            reporter,
            out,
        }
    }

    /// List repositories and scan them. A listing failure is fatal and
    /// happens before anything is written.
    pub fn run(self, lister: &dyn RepositoryLister) -> Result<ScanSummary, FatalError> {
        let repositories = lister.list()?;
        self.scan(&repositories)
    }

    /// Scan the given repositories in order.
    ///
    /// Clone, directory and file failures are reported and skipped. Only an
    /// output failure stops the run.
    pub fn scan(self, repositories: &[RepositoryRef]) -> Result<ScanSummary, FatalError> {
        let ScanCoordinator {
            pattern,
            cloner,
            reporter,
            out,
        } = self;

        let mut sink = CsvSink::new(out, pattern.schema())?;
        let mut summary = ScanSummary::default();

        for repository in repositories {
            summary.repositories += 1;
            reporter.repository_started(repository);

            let tree = match cloner.clone_repo(repository) {
                Ok(tree) => tree,
                Err(err) => {
                    summary.failed_repositories += 1;
                    reporter.clone_failed(&err);
                    continue;
                }
            };

            let walked = searchers::walk(tree.as_ref(), repository.name(), pattern, &mut *reporter, |path, values| {
                sink.write(&MatchRecord {
                    repository: repository.name().to_string(),
                    file: path.to_string(),
                    values,
                })
            });

            // release even when the walk hit an output failure
            if let Err(err) = tree.release() {
                reporter.release_failed(repository, &err);
            }

            let stats = walked?;
            reporter.repository_finished(repository, &stats);
            summary.walk.absorb(stats);
        }

        reporter.run_finished(&summary);
        Ok(summary)
    }
}
