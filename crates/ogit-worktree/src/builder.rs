//! Directory snapshots as tree objects.
//!
//! The walk never recurses on the native stack. Directories are discovered
//! into an arena of frames, each holding its parent's index. A child is
//! always pushed after its parent, so walking the arena from the end
//! writes every subtree before the tree that references it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ogit_store::{Blob, EntryMode, ObjectStore, Tree, TreeEntry};
use ogit_types::ObjectId;
use tracing::debug;

use crate::error::{WorktreeError, WorktreeResult};
use crate::ignore::IgnoreSet;

/// One directory awaiting its tree object. Frame 0 is the root; its
/// `parent` is unused.
#[derive(Debug)]
struct Frame {
    path: PathBuf,
    name: String,
    parent: usize,
    entries: Vec<TreeEntry>,
}

impl Frame {
    fn new(path: PathBuf, name: String, parent: usize) -> Self {
        Self {
            path,
            name,
            parent,
            entries: Vec::new(),
        }
    }
}

enum ChildKind {
    Directory,
    File,
}

/// Builds blob and tree objects from a directory on disk.
pub struct TreeBuilder {
    store: Arc<dyn ObjectStore>,
    ignore: IgnoreSet,
}

impl std::fmt::Debug for TreeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("ignore", &self.ignore)
            .finish()
    }
}

impl TreeBuilder {
    /// Create a builder writing into `store` that skips nothing.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_ignore(store, IgnoreSet::new())
    }

    /// Create a builder writing into `store` that skips `ignore`.
    pub fn with_ignore(store: Arc<dyn ObjectStore>, ignore: IgnoreSet) -> Self {
        Self { store, ignore }
    }

    /// Snapshot `root` and return the id of its tree.
    ///
    /// Stops at the first error; objects already written stay in the store
    /// but no tree referencing a partial listing is produced.
    pub fn build(&self, root: &Path) -> WorktreeResult<ObjectId> {
        let mut frames = vec![Frame::new(root.to_path_buf(), String::new(), 0)];

        let mut cursor = 0;
        while cursor < frames.len() {
            let dir = frames[cursor].path.clone();
            for (name, path, kind) in self.list_children(&dir)? {
                match kind {
                    ChildKind::Directory => frames.push(Frame::new(path, name, cursor)),
                    ChildKind::File => {
                        let id = self.write_blob(&path)?;
                        frames[cursor]
                            .entries
                            .push(TreeEntry::new(EntryMode::Regular, name, id));
                    }
                }
            }
            cursor += 1;
        }

        for index in (1..frames.len()).rev() {
            let entries = std::mem::take(&mut frames[index].entries);
            let id = self.write_tree(&frames[index].path, entries)?;
            let name = std::mem::take(&mut frames[index].name);
            let parent = frames[index].parent;
            frames[parent]
                .entries
                .push(TreeEntry::new(EntryMode::Directory, name, id));
        }

        let entries = std::mem::take(&mut frames[0].entries);
        self.write_tree(root, entries)
    }

    /// Store the contents of `path` as a blob.
    pub fn write_blob(&self, path: &Path) -> WorktreeResult<ObjectId> {
        let data = fs::read(path).map_err(|e| WorktreeError::io(path, e))?;
        let size = data.len();
        let id = self.store.write(&Blob::new(data).into_raw_object())?;
        debug!(path = %path.display(), %id, size, "stored blob");
        Ok(id)
    }

    fn write_tree(&self, path: &Path, entries: Vec<TreeEntry>) -> WorktreeResult<ObjectId> {
        let tree = Tree::new(entries);
        let id = self.store.write(&tree.to_raw_object()?)?;
        debug!(path = %path.display(), %id, entries = tree.len(), "stored tree");
        Ok(id)
    }

    fn list_children(&self, dir: &Path) -> WorktreeResult<Vec<(String, PathBuf, ChildKind)>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| WorktreeError::io(dir, e))? {
            let entry = entry.map_err(|e| WorktreeError::io(dir, e))?;
            let path = entry.path();
            let name = entry
                .file_name()
                .into_string()
                .map_err(|_| WorktreeError::InvalidName(path.clone()))?;
            if self.ignore.is_ignored(&name, &path) {
                debug!(path = %path.display(), "ignored");
                continue;
            }

            let file_type = entry.file_type().map_err(|e| WorktreeError::io(&path, e))?;
            let kind = if file_type.is_dir() {
                ChildKind::Directory
            } else if file_type.is_file() {
                ChildKind::File
            } else if file_type.is_symlink() {
                let target = match fs::metadata(&path) {
                    Ok(meta) => meta,
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        return Err(WorktreeError::DanglingSymlink(path))
                    }
                    Err(e) => return Err(WorktreeError::io(&path, e)),
                };
                if target.is_dir() {
                    return Err(WorktreeError::SymlinkedDirectory(path));
                }
                ChildKind::File
            } else {
                return Err(WorktreeError::UnsupportedFileType(path));
            };
            children.push((name, path, kind));
        }
        Ok(children)
    }
}
