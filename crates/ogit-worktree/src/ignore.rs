use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

type IgnorePredicate = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Names and paths the tree builder skips.
///
/// Matching is by exact file name at any depth, plus an optional predicate
/// over the full path for anything more specific.
#[derive(Clone, Default)]
pub struct IgnoreSet {
    names: BTreeSet<String>,
    predicate: Option<IgnorePredicate>,
}

impl IgnoreSet {
    /// An ignore set that skips nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip every entry called `name`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Skip every entry whose name is in `names`.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Skip every path for which `predicate` returns `true`.
    ///
    /// Replaces any previously set predicate.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Whether the entry `name` at `path` should be skipped.
    pub fn is_ignored(&self, name: &str, path: &Path) -> bool {
        self.names.contains(name) || self.predicate.as_ref().is_some_and(|p| p(path))
    }

    /// The exact names in this set.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl fmt::Debug for IgnoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreSet")
            .field("names", &self.names)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}
