use super::{join_path, WorkingTree};
use crate::error::TreeError;
use crate::types::TreeEntry;
use git2::{ErrorCode, ObjectType, Oid, Repository, Tree};
use log::debug;
use std::io::{BufRead, Cursor};
use std::path::Path;
use tempfile::TempDir;

const FILEMODE_LINK: i32 = 0o120000;

/// Snapshot of one commit's tree, read straight from the object database.
///
/// Nothing is checked out: directory listings come from tree objects and
/// file contents from blobs. When the repository lives in a private
/// temporary directory (a fresh clone) the tree owns that directory and
/// removes it on [`WorkingTree::release`].
pub struct GitTree {
    repo: Repository,
    root: Oid,
    storage: Option<TempDir>,
}

impl GitTree {
    /// Tree of the commit HEAD points at
    pub fn from_head(repo: Repository, storage: Option<TempDir>) -> Result<Self, TreeError> {
        let root = repo.head()?.peel_to_tree()?.id();
        Ok(Self { repo, root, storage })
    }

    fn tree_at(&self, dir: &str) -> Result<Tree<'_>, TreeError> {
        let root = self.repo.find_tree(self.root)?;
        if dir.is_empty() {
            return Ok(root);
        }

        let entry = root.get_path(Path::new(dir)).map_err(|e| lookup_error(e, dir))?;
        match entry.kind() {
            Some(ObjectType::Tree) => Ok(self.repo.find_tree(entry.id())?),
            _ => Err(TreeError::NotADirectory(dir.to_string())),
        }
    }
}

fn lookup_error(err: git2::Error, path: &str) -> TreeError {
    if err.code() == ErrorCode::NotFound {
        TreeError::NotFound(path.to_string())
    } else {
        TreeError::Git(err)
    }
}

impl WorkingTree for GitTree {
    fn read_dir(&self, dir: &str) -> Result<Vec<TreeEntry>, TreeError> {
        let tree = self.tree_at(dir)?;

        let mut entries = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let name = String::from_utf8_lossy(entry.name_bytes());
            let path = join_path(dir, &name);
            match entry.kind() {
                Some(ObjectType::Tree) => entries.push(TreeEntry::dir(path)),
                Some(ObjectType::Blob) if entry.filemode() == FILEMODE_LINK => {
                    debug!("skipping symlink {}", path);
                }
                Some(ObjectType::Blob) => entries.push(TreeEntry::file(path)),
                // gitlinks (submodules) point at commits of other repositories
                _ => debug!("skipping submodule {}", path),
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn open(&self, path: &str) -> Result<Box<dyn BufRead + '_>, TreeError> {
        let root = self.repo.find_tree(self.root)?;
        let entry = root.get_path(Path::new(path)).map_err(|e| lookup_error(e, path))?;
        if entry.kind() != Some(ObjectType::Blob) {
            return Err(TreeError::NotAFile(path.to_string()));
        }

        let blob = self.repo.find_blob(entry.id())?;
        Ok(Box::new(Cursor::new(blob.content().to_vec())))
    }

    fn release(self: Box<Self>) -> Result<(), TreeError> {
        let GitTree { repo, storage, .. } = *self;
        drop(repo);
        if let Some(storage) = storage {
            storage.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use std::io::Read;

    fn commit_files(dir: &Path, files: &[(&str, &str)]) -> Repository {
        let repo = Repository::init(dir).unwrap();
        for (path, content) in files {
            let full = dir.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, content).unwrap();
        }

        {
            let mut index = repo.index().unwrap();
            index
                .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
                .unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = Signature::now("test", "test@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[]).unwrap();
        }

        repo
    }

    #[test]
    fn test_lists_head_tree() {
        let dir = TempDir::new().unwrap();
        let repo = commit_files(
            dir.path(),
            &[("b.txt", "b\n"), ("a/x.go", "package a\n"), ("a/y/z.txt", "z\n")],
        );
        let tree = GitTree::from_head(repo, None).unwrap();

        assert_eq!(
            tree.read_dir("").unwrap(),
            vec![TreeEntry::dir("a"), TreeEntry::file("b.txt")]
        );
        assert_eq!(
            tree.read_dir("a").unwrap(),
            vec![TreeEntry::file("a/x.go"), TreeEntry::dir("a/y")]
        );
    }

    #[test]
    fn test_reads_blob_content() {
        let dir = TempDir::new().unwrap();
        let repo = commit_files(dir.path(), &[("pkg/x.go", "// TODO(alice): fix this\n")]);
        let tree = GitTree::from_head(repo, None).unwrap();

        let mut content = String::new();
        tree.open("pkg/x.go").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "// TODO(alice): fix this\n");
    }

    #[test]
    fn test_missing_and_mistyped_paths() {
        let dir = TempDir::new().unwrap();
        let repo = commit_files(dir.path(), &[("pkg/x.go", "x\n")]);
        let tree = GitTree::from_head(repo, None).unwrap();

        assert!(matches!(tree.read_dir("nope"), Err(TreeError::NotFound(_))));
        assert!(matches!(tree.read_dir("pkg/x.go"), Err(TreeError::NotADirectory(_))));
        assert!(matches!(tree.open("pkg"), Err(TreeError::NotAFile(_))));
    }

    #[test]
    fn test_release_removes_storage() {
        let storage = TempDir::new().unwrap();
        let path = storage.path().to_path_buf();
        let repo = commit_files(&path, &[("a.txt", "a\n")]);
        let tree: Box<dyn WorkingTree> = Box::new(GitTree::from_head(repo, Some(storage)).unwrap());

        tree.release().unwrap();
        assert!(!path.exists());
    }
}
