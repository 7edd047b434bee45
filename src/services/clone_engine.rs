use super::credentials::Credential;
use crate::error::CloneError;
use crate::tree::{GitTree, WorkingTree};
use crate::types::RepositoryRef;
use git2::build::RepoBuilder;
use git2::{Cred, FetchOptions, RemoteCallbacks};
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// Produces one ephemeral working tree per repository
#[cfg_attr(test, mockall::automock)]
pub trait Cloner {
    fn clone_repo(&self, repository: &RepositoryRef) -> Result<Box<dyn WorkingTree>, CloneError>;
}

/// Shallow clone through libgit2.
///
/// Objects are fetched into a private temporary directory that only the
/// returned [`GitTree`] knows about; nothing is checked out. The directory
/// is on disk (libgit2 has no in-memory fetch target) and is removed when
/// the tree is released or dropped; a killed process leaves it behind.
///
/// libgit2's local transport refuses shallow fetches, so local paths and
/// `file://` URLs are always fetched in full.
#[derive(Debug, Clone)]
pub struct GitCloner {
    credential: Option<Credential>,
    depth: i32,
    storage_root: Option<PathBuf>,
}

impl GitCloner {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
            depth: 1,
            storage_root: None,
        }
    }

    /// Clone without credentials (public repositories, local paths)
    pub fn anonymous() -> Self {
        Self {
            credential: None,
            depth: 1,
            storage_root: None,
        }
    }

    /// History depth for remote fetches; 0 fetches everything
    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// Create clone directories under `root` instead of the system temp dir
    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = Some(root.into());
        self
    }

    fn depth_for(&self, url: &str) -> i32 {
        if is_local_url(url) {
            0
        } else {
            self.depth
        }
    }

    fn callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        if let Some(credential) = &self.credential {
            // libgit2 keeps asking as long as the callback succeeds
            let attempts = Cell::new(0);
            callbacks.credentials(move |_url, _username, _allowed| {
                attempts.set(attempts.get() + 1);
                if attempts.get() > 1 {
                    return Err(git2::Error::from_str("authentication rejected"));
                }
                Cred::userpass_plaintext(&credential.user, &credential.token)
            });
        }
        callbacks
    }
}

impl Cloner for GitCloner {
    fn clone_repo(&self, repository: &RepositoryRef) -> Result<Box<dyn WorkingTree>, CloneError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("hubgrep-");
        let storage = match &self.storage_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| CloneError::new(repository.name(), e))?;

        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(self.callbacks());
        fetch.depth(self.depth_for(&repository.url));

        let repo = RepoBuilder::new()
            .bare(true)
            .fetch_options(fetch)
            .clone(&repository.url, storage.path())
            .map_err(|e| CloneError::new(repository.name(), e.message()))?;

        let tree = GitTree::from_head(repo, Some(storage))
            .map_err(|e| CloneError::new(repository.name(), format!("can not get worktree: {}", e)))?;

        Ok(Box::new(tree))
    }
}

/// Local paths and `file://` URLs; `host:path` scp-style URLs are remote
fn is_local_url(url: &str) -> bool {
    if url.starts_with("file://") {
        return true;
    }
    if url.contains("://") {
        return false;
    }
    match url.find(':') {
        Some(colon) => url.find('/').is_some_and(|slash| slash < colon) || Path::new(url).is_absolute(),
        None => true,
    }
}
