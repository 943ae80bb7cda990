use serde::{Deserialize, Serialize};

use crate::path::FilePath;

/// An insertion-ordered set of paths.
///
/// Used for both the selection and the fold state. Both are owned by the caller; the
/// engine only ever builds a *next* set and hands it back through an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathSet(Vec<FilePath>);

pub type Selection = PathSet;
pub type FoldSet = PathSet;

impl PathSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, path: &FilePath) -> bool {
        self.0.iter().any(|p| p == path)
    }

    /// `true` when `path` or one of its ancestors is in the set.
    pub fn covers(&self, path: &FilePath) -> bool {
        self.0.iter().any(|p| path.starts_with(p))
    }

    /// Returns `false` if the path was already present.
    pub fn insert(&mut self, path: FilePath) -> bool {
        if self.contains(&path) {
            return false;
        }
        self.0.push(path);
        true
    }

    /// Returns `false` if the path was not present.
    pub fn remove(&mut self, path: &FilePath) -> bool {
        let len = self.0.len();
        self.0.retain(|p| p != path);
        self.0.len() != len
    }

    /// Flip membership of `path`. Returns whether it is a member afterwards.
    pub fn toggle(&mut self, path: &FilePath) -> bool {
        if self.remove(path) {
            false
        } else {
            self.0.push(path.clone());
            true
        }
    }

    pub fn retain(&mut self, f: impl FnMut(&FilePath) -> bool) {
        self.0.retain(f);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilePath> {
        self.0.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[FilePath] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<FilePath> {
        self.0
    }
}

impl FromIterator<FilePath> for PathSet {
    fn from_iter<I: IntoIterator<Item = FilePath>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a FilePath;
    type IntoIter = std::slice::Iter<'a, FilePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for PathSet {
    type Item = FilePath;
    type IntoIter = std::vec::IntoIter<FilePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Emitted when a fold icon is pressed.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldEvent {
    pub path: FilePath,
    /// Whether `path` is folded in `folded`.
    pub is_folded: bool,
    /// The next fold set.
    pub folded: PathSet,
}

pub fn toggle_fold(folded: &PathSet, path: &FilePath) -> FoldEvent {
    let mut next = folded.clone();
    let is_folded = next.toggle(path);
    tracing::debug!(%path, is_folded, "toggle fold");
    FoldEvent {
        path: path.clone(),
        is_folded,
        folded: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_operations_keep_insertion_order() {
        let mut set = PathSet::new();
        assert!(set.insert(FilePath::new(["b"])));
        assert!(set.insert(FilePath::new(["a"])));
        assert!(!set.insert(FilePath::new(["b"])));
        assert_eq!(
            set.as_slice(),
            &[FilePath::new(["b"]), FilePath::new(["a"])]
        );

        assert!(set.remove(&FilePath::new(["b"])));
        assert!(!set.remove(&FilePath::new(["b"])));
        assert!(set.toggle(&FilePath::new(["c"])));
        assert!(!set.toggle(&FilePath::new(["a"])));
        assert_eq!(set.as_slice(), &[FilePath::new(["c"])]);
    }

    #[test]
    fn covers_checks_ancestors() {
        let set = PathSet::from_iter([FilePath::new(["a"])]);
        assert!(set.covers(&FilePath::new(["a"])));
        assert!(set.covers(&FilePath::new(["a", "b"])));
        assert!(!set.covers(&FilePath::new(["b"])));
    }

    #[test]
    fn toggle_fold_builds_next_set() {
        let folded = PathSet::from_iter([FilePath::new(["a"])]);

        let event = toggle_fold(&folded, &FilePath::new(["b"]));
        assert!(event.is_folded);
        assert_eq!(event.folded.len(), 2);

        let event = toggle_fold(&event.folded, &FilePath::new(["a"]));
        assert!(!event.is_folded);
        assert_eq!(event.folded.as_slice(), &[FilePath::new(["b"])]);
        assert_eq!(folded.len(), 1);
    }

    #[test]
    fn serializes_as_nested_arrays() {
        let set = PathSet::from_iter([FilePath::new(["a", "b"])]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[["a","b"]]"#);
        let back: PathSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
