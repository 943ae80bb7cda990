use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used when a [`FilePath`] is joined into a lookup key.
pub const DEFAULT_PATH_SEPARATOR: &str = "///";

/// Ordered sequence of ids from a root record down to a node.
///
/// This is the canonical representation of a tree position. Joined string keys
/// (see [`FilePath::key`]) are derived from it only where a hash lookup needs them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilePath(Vec<String>);

impl FilePath {
    /// The empty path, which addresses the (virtual) parent of all roots.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Split a joined key back into its segments. An empty key is the root path.
    pub fn from_key(key: &str, separator: &str) -> Self {
        if key.is_empty() {
            return Self::root();
        }
        Self(key.split(separator).map(str::to_string).collect())
    }

    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn parent(&self) -> FilePath {
        self.prefix(self.0.len().saturating_sub(1))
    }

    pub fn child(&self, id: impl Into<String>) -> FilePath {
        let mut segments = self.0.clone();
        segments.push(id.into());
        Self(segments)
    }

    /// The first `len` segments (clamped to the path length).
    pub fn prefix(&self, len: usize) -> FilePath {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// `true` when `other` is this path or one of its ancestors.
    pub fn starts_with(&self, other: &FilePath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// `true` when `ancestor` is a strict prefix of this path.
    pub fn is_descendant_of(&self, ancestor: &FilePath) -> bool {
        self.0.len() > ancestor.0.len() && self.starts_with(ancestor)
    }

    /// Replace the leading `from` segments with `to`, or `None` when `from` is not a prefix.
    pub fn rebase(&self, from: &FilePath, to: &FilePath) -> Option<FilePath> {
        if !self.starts_with(from) {
            return None;
        }
        let mut segments = to.0.clone();
        segments.extend_from_slice(&self.0[from.0.len()..]);
        Some(Self(segments))
    }

    pub fn key(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<Vec<String>> for FilePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl<S: Into<String>> FromIterator<S> for FilePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trips_through_separator() {
        let path = FilePath::new(["src", "ui", "button.rs"]);
        let key = path.key(DEFAULT_PATH_SEPARATOR);
        assert_eq!(key, "src///ui///button.rs");
        assert_eq!(FilePath::from_key(&key, DEFAULT_PATH_SEPARATOR), path);
        assert_eq!(FilePath::from_key("", DEFAULT_PATH_SEPARATOR), FilePath::root());
    }

    #[test]
    fn prefix_relations() {
        let a = FilePath::new(["a"]);
        let ab = FilePath::new(["a", "b"]);
        let ac = FilePath::new(["a", "c"]);

        assert!(ab.starts_with(&a));
        assert!(ab.starts_with(&ab));
        assert!(ab.is_descendant_of(&a));
        assert!(!ab.is_descendant_of(&ab));
        assert!(!ac.starts_with(&ab));
        assert!(ab.starts_with(&FilePath::root()));
        assert_eq!(ab.parent(), a);
        assert_eq!(a.parent(), FilePath::root());
        assert_eq!(ab.prefix(5), ab);
    }

    #[test]
    fn rebase_moves_prefix() {
        let folded = FilePath::new(["a", "b", "c"]);
        let moved = folded.rebase(&FilePath::new(["a", "b"]), &FilePath::new(["d", "b"]));
        assert_eq!(moved, Some(FilePath::new(["d", "b", "c"])));
        assert_eq!(folded.rebase(&FilePath::new(["x"]), &FilePath::root()), None);
    }
}
