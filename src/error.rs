//! Error taxonomy
//!
//! Fatal errors stop the run before (or instead of) scanning anything.
//! Recoverable errors are scoped to one repository, directory or file and
//! are handed to a [`crate::reporter::ScanReporter`] instead of unwinding.

use std::io;

/// Failure while reading a working tree
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("not a file: {0}")]
    NotAFile(String),
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Any failure producing a working tree for one repository
#[derive(Debug, thiserror::Error)]
#[error("can not clone {repository}: {cause}")]
pub struct CloneError {
    pub repository: String,
    pub cause: String,
}

impl CloneError {
    pub fn new(repository: impl Into<String>, cause: impl ToString) -> Self {
        Self {
            repository: repository.into(),
            cause: cause.to_string(),
        }
    }
}

/// A directory inside a repository could not be listed
#[derive(Debug, thiserror::Error)]
#[error("can not list {path:?} in {repository}: {source}")]
pub struct DirReadError {
    pub repository: String,
    pub path: String,
    #[source]
    pub source: TreeError,
}

/// A file inside a repository could not be opened or read
#[derive(Debug, thiserror::Error)]
#[error("can not read {path:?} in {repository}: {source}")]
pub struct FileReadError {
    pub repository: String,
    pub path: String,
    #[source]
    pub source: TreeError,
}

/// Credential lookup failure
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("can not find authentication for {0:?}. Install \"hub\" and authenticate.")]
    Missing(String),
    #[error("can not read hub config {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("can not parse hub config {path}: {source}")]
    Parse { path: String, source: serde_yaml::Error },
}

/// Repository listing failure
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("{url} returned {status}")]
    Status { url: String, status: reqwest::StatusCode },
}

/// Writing a record to the output failed
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("output error: {0}")]
    Csv(#[from] csv::Error),
    #[error("output error: {0}")]
    Io(#[from] io::Error),
}

impl OutputError {
    /// True when the reader on the other end went away (e.g. `| head`)
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            OutputError::Io(e) => e.kind() == io::ErrorKind::BrokenPipe,
            OutputError::Csv(e) => matches!(e.kind(), csv::ErrorKind::Io(e) if e.kind() == io::ErrorKind::BrokenPipe),
        }
    }
}

/// Everything that terminates the whole run
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("no patterns passed")]
    NoPatterns,
    #[error("can not parse {pattern:?}: {source}")]
    InvalidPattern { pattern: String, source: regex::Error },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Auth(#[from] CredentialError),
    #[error("error creating client: {0}")]
    Client(String),
    #[error("error listing repositories: {0}")]
    List(#[from] ListError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl FatalError {
    pub fn exit_code(&self) -> i32 {
        match self {
            FatalError::Output(e) if e.is_broken_pipe() => 0,
            _ => 1,
        }
    }
}
