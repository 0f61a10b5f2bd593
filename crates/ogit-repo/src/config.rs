use ogit_store::compress::DEFAULT_LEVEL;
use ogit_worktree::IgnoreSet;
use serde::{Deserialize, Serialize};

/// Repository layout and behaviour settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Name of the metadata directory inside the work tree.
    pub metadata_dir: String,
    /// Branch `HEAD` points at after `init`.
    pub default_branch: String,
    /// zlib level used for new loose objects (0-9).
    pub compression_level: u32,
    /// Extra file or directory names `write-tree` skips. The metadata
    /// directory is always skipped.
    pub ignore: Vec<String>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            metadata_dir: ".git".into(),
            default_branch: "main".into(),
            compression_level: DEFAULT_LEVEL,
            ignore: Vec::new(),
        }
    }
}

impl RepoConfig {
    /// The ignore set handed to the tree builder.
    pub fn ignore_set(&self) -> IgnoreSet {
        IgnoreSet::new()
            .with_name(self.metadata_dir.clone())
            .with_names(self.ignore.iter().cloned())
    }
}
