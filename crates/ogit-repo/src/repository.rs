use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ogit_store::{Blob, LooseObjectStore, ObjectKind, ObjectStore, RawObject, Tree};
use ogit_types::ObjectId;
use ogit_worktree::TreeBuilder;
use tracing::{debug, info};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};

/// A repository: a work tree plus its metadata directory.
pub struct Repository {
    work_dir: PathBuf,
    git_dir: PathBuf,
    config: RepoConfig,
    store: Arc<LooseObjectStore>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("work_dir", &self.work_dir)
            .field("git_dir", &self.git_dir)
            .finish()
    }
}

impl Repository {
    /// Create the store skeleton under `work_dir` and open it.
    ///
    /// Safe to run over an existing repository: missing directories are
    /// created and `HEAD` is only written if absent.
    pub fn init(work_dir: impl Into<PathBuf>, config: RepoConfig) -> RepoResult<Self> {
        let work_dir = work_dir.into();
        let git_dir = work_dir.join(&config.metadata_dir);

        for dir in [git_dir.join("objects"), git_dir.join("refs")] {
            fs::create_dir_all(&dir).map_err(|e| RepoError::io(&dir, e))?;
        }
        let head = git_dir.join("HEAD");
        if !head.exists() {
            let contents = format!("ref: refs/heads/{}\n", config.default_branch);
            fs::write(&head, contents).map_err(|e| RepoError::io(&head, e))?;
        }

        info!(git_dir = %git_dir.display(), "initialized repository");
        Ok(Self::from_parts(work_dir, git_dir, config))
    }

    /// Open the repository whose work tree is exactly `work_dir`.
    pub fn open(work_dir: impl Into<PathBuf>, config: RepoConfig) -> RepoResult<Self> {
        let work_dir = work_dir.into();
        if !Self::exists_at(&work_dir, &config) {
            return Err(RepoError::NotARepository(work_dir));
        }
        let git_dir = work_dir.join(&config.metadata_dir);
        Ok(Self::from_parts(work_dir, git_dir, config))
    }

    /// Open the nearest repository at or above `start`.
    pub fn discover(start: impl AsRef<Path>, config: RepoConfig) -> RepoResult<Self> {
        let start = start.as_ref();
        for dir in start.ancestors() {
            if Self::exists_at(dir, &config) {
                debug!(work_dir = %dir.display(), "discovered repository");
                return Self::open(dir, config);
            }
        }
        Err(RepoError::NotARepository(start.to_path_buf()))
    }

    /// Whether `work_dir` holds a metadata directory with an object store.
    pub fn exists_at(work_dir: &Path, config: &RepoConfig) -> bool {
        work_dir.join(&config.metadata_dir).join("objects").is_dir()
    }

    fn from_parts(work_dir: PathBuf, git_dir: PathBuf, config: RepoConfig) -> Self {
        let store = Arc::new(LooseObjectStore::with_compression(
            git_dir.join("objects"),
            config.compression_level,
        ));
        Self {
            work_dir,
            git_dir,
            config,
            store,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn store(&self) -> &LooseObjectStore {
        &self.store
    }

    // ---- Content operations ----

    /// Compute the blob id of `path`, storing the blob if `write` is set.
    pub fn hash_object(&self, path: &Path, write: bool) -> RepoResult<ObjectId> {
        let data = fs::read(path).map_err(|e| RepoError::io(path, e))?;
        self.hash_bytes(data, write)
    }

    /// Compute the blob id of `data`, storing the blob if `write` is set.
    pub fn hash_bytes(&self, data: Vec<u8>, write: bool) -> RepoResult<ObjectId> {
        let raw = Blob::new(data).into_raw_object();
        if write {
            Ok(self.store.write(&raw)?)
        } else {
            Ok(raw.compute_id())
        }
    }

    /// Read and decode any object.
    pub fn read_object(&self, id: &ObjectId) -> RepoResult<RawObject> {
        Ok(self.store.read(id)?)
    }

    /// Read an object and decode it as a tree.
    pub fn read_tree(&self, id: &ObjectId) -> RepoResult<Tree> {
        let raw = self.read_object(id)?;
        if raw.kind != ObjectKind::Tree {
            return Err(RepoError::NotATree {
                id: *id,
                kind: raw.kind,
            });
        }
        Ok(Tree::from_raw_object(&raw)?)
    }

    /// Snapshot the work tree and return the root tree id.
    pub fn write_tree(&self) -> RepoResult<ObjectId> {
        self.write_tree_at(&self.work_dir)
    }

    /// Snapshot `dir` (usually inside the work tree) into this repository.
    pub fn write_tree_at(&self, dir: &Path) -> RepoResult<ObjectId> {
        let store: Arc<dyn ObjectStore> = self.store.clone();
        let builder = TreeBuilder::with_ignore(store, self.config.ignore_set());
        Ok(builder.build(dir)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogit_crypto::ContentHasher;
    use ogit_store::{EntryMode, StoreError};

    fn temp_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path(), RepoConfig::default()).unwrap();
        (dir, repo)
    }

    #[test]
    fn init_creates_skeleton() {
        let (dir, repo) = temp_repo();
        let git = dir.path().join(".git");
        assert!(git.join("objects").is_dir());
        assert!(git.join("refs").is_dir());
        assert_eq!(
            fs::read_to_string(git.join("HEAD")).unwrap(),
            "ref: refs/heads/main\n"
        );
        assert_eq!(repo.git_dir(), git);
        assert_eq!(repo.store().objects_dir(), git.join("objects"));
    }

    #[test]
    fn init_twice_keeps_objects_and_head() {
        let (dir, repo) = temp_repo();
        let id = repo.hash_bytes(b"keep".to_vec(), true).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/dev\n").unwrap();

        let again = Repository::init(dir.path(), RepoConfig::default()).unwrap();
        assert!(again.store().contains(&id).unwrap());
        assert_eq!(
            fs::read_to_string(dir.path().join(".git/HEAD")).unwrap(),
            "ref: refs/heads/dev\n"
        );
    }

    #[test]
    fn custom_metadata_dir_and_branch() {
        let dir = tempfile::tempdir().unwrap();
        let config = RepoConfig {
            metadata_dir: ".ogit".into(),
            default_branch: "trunk".into(),
            ..Default::default()
        };
        Repository::init(dir.path(), config.clone()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join(".ogit/HEAD")).unwrap(),
            "ref: refs/heads/trunk\n"
        );
        assert!(Repository::open(dir.path(), config).is_ok());
        assert!(Repository::open(dir.path(), RepoConfig::default()).is_err());
    }

    #[test]
    fn open_without_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Repository::open(dir.path(), RepoConfig::default()).unwrap_err();
        assert!(matches!(err, RepoError::NotARepository(_)));
    }

    #[test]
    fn discover_walks_up() {
        let (dir, _repo) = temp_repo();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let found = Repository::discover(&nested, RepoConfig::default()).unwrap();
        assert_eq!(found.work_dir(), dir.path());
    }

    #[test]
    fn hash_object_with_and_without_write() {
        let (dir, repo) = temp_repo();
        let file = dir.path().join("hello.txt");
        fs::write(&file, "hello\n").unwrap();

        let id = repo.hash_object(&file, false).unwrap();
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(!repo.store().contains(&id).unwrap());

        assert_eq!(repo.hash_object(&file, true).unwrap(), id);
        let raw = repo.read_object(&id).unwrap();
        assert_eq!(raw.kind, ObjectKind::Blob);
        assert_eq!(raw.payload, b"hello\n");
    }

    #[test]
    fn hash_object_missing_file_is_io_error() {
        let (dir, repo) = temp_repo();
        let err = repo.hash_object(&dir.path().join("nope"), true).unwrap_err();
        assert!(matches!(err, RepoError::Io { .. }));
    }

    #[test]
    fn read_missing_object_is_not_found() {
        let (_dir, repo) = temp_repo();
        let id = ObjectId::from_hash([3; 20]);
        let err = repo.read_object(&id).unwrap_err();
        assert!(matches!(err, RepoError::Store(StoreError::ObjectNotFound(x)) if x == id));
        assert_eq!(err.to_string(), format!("object not found: {id}"));
    }

    #[test]
    fn write_tree_skips_metadata_dir() {
        let (dir, repo) = temp_repo();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let root = repo.write_tree().unwrap();
        let tree = repo.read_tree(&root).unwrap();
        let listed: Vec<_> = tree
            .entries
            .iter()
            .map(|e| (e.mode, e.name.as_str()))
            .collect();
        assert_eq!(
            listed,
            [(EntryMode::Regular, "a.txt"), (EntryMode::Directory, "sub")]
        );
        assert!(repo.store().contains(&tree.entries[0].object_id).unwrap());
    }

    #[test]
    fn write_tree_respects_extra_ignores() {
        let dir = tempfile::tempdir().unwrap();
        let config = RepoConfig {
            ignore: vec!["main.js".into()],
            ..Default::default()
        };
        let repo = Repository::init(dir.path(), config).unwrap();
        fs::write(dir.path().join("main.js"), "self").unwrap();
        let root = repo.write_tree().unwrap();
        assert_eq!(root, ContentHasher::digest(b"tree 0\0"));
    }

    #[test]
    fn read_tree_on_blob_is_not_a_tree() {
        let (_dir, repo) = temp_repo();
        let id = repo.hash_bytes(b"x".to_vec(), true).unwrap();
        let err = repo.read_tree(&id).unwrap_err();
        assert!(matches!(err, RepoError::NotATree { kind: ObjectKind::Blob, .. }));
    }
}
