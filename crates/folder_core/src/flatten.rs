use std::collections::HashMap;

use crate::accessor::FolderAccessor;
use crate::path::FilePath;
use crate::store::PathSet;

/// One visible node of a flatten pass.
///
/// Records never point at each other; parents are found by looking up `parent_path`
/// in the [`FlatTree`] that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo<T> {
    pub id: String,
    pub path: FilePath,
    pub parent_path: FilePath,
    /// Joined form of `path`, used as the lookup key.
    pub key: String,
    pub depth: usize,
    /// Position among siblings at the time of flattening.
    pub index: usize,
    /// Ancestor ids, excluding this node.
    pub scope: Vec<String>,
    /// The node itself, cloned. See [`flatten`] on keeping this cheap.
    pub value: T,
}

impl<T> FileInfo<T> {
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_path.is_root()
    }
}

fn make_info<T: Clone, A: FolderAccessor<T> + ?Sized>(
    accessor: &A,
    value: &T,
    index: usize,
    scope: &[String],
    parent_path: &FilePath,
    separator: &str,
) -> FileInfo<T> {
    let id = accessor.id_of(value, index, scope);
    let path = accessor.path_of(&id, scope, value, index);
    FileInfo {
        key: path.key(separator),
        id,
        path,
        parent_path: parent_path.clone(),
        depth: scope.len(),
        index,
        scope: scope.to_vec(),
        value: value.clone(),
    }
}

/// Pre-order walk over every node whose ancestors are all unfolded.
///
/// A folded node is itself part of the output; only its descendants are skipped.
///
/// Every record holds a clone of its node, so `T` should be cheap to clone. Nodes that
/// own their children should keep them behind an `Rc` (or be an `Rc` themselves).
pub fn flatten<T: Clone, A: FolderAccessor<T> + ?Sized>(
    roots: &[T],
    accessor: &A,
    folded: &PathSet,
    separator: &str,
) -> Vec<FileInfo<T>> {
    fn walk<T: Clone, A: FolderAccessor<T> + ?Sized>(
        items: &[T],
        accessor: &A,
        folded: &PathSet,
        separator: &str,
        scope: &[String],
        parent_path: &FilePath,
        out: &mut Vec<FileInfo<T>>,
    ) {
        for (index, value) in items.iter().enumerate() {
            let info = make_info(accessor, value, index, scope, parent_path, separator);
            let path = info.path.clone();
            let mut next_scope = scope.to_vec();
            next_scope.push(info.id.clone());
            out.push(info);

            if folded.contains(&path) {
                continue;
            }
            let children = accessor.children_of(value, scope);
            if !children.is_empty() {
                walk(
                    children,
                    accessor,
                    folded,
                    separator,
                    &next_scope,
                    &path,
                    out,
                );
            }
        }
    }

    let mut out = Vec::new();
    walk(
        roots,
        accessor,
        folded,
        separator,
        &[],
        &FilePath::root(),
        &mut out,
    );
    out
}

/// The full, fold-independent child list of `parent` (or of the root when `None`).
pub fn children_infos<T: Clone, A: FolderAccessor<T> + ?Sized>(
    roots: &[T],
    accessor: &A,
    parent: Option<&FileInfo<T>>,
    separator: &str,
) -> Vec<FileInfo<T>> {
    let (children, scope, parent_path) = match parent {
        Some(parent) => {
            let mut scope = parent.scope.clone();
            scope.push(parent.id.clone());
            (
                accessor.children_of(&parent.value, &parent.scope),
                scope,
                parent.path.clone(),
            )
        }
        None => (roots, Vec::new(), FilePath::root()),
    };

    children
        .iter()
        .enumerate()
        .map(|(index, value)| make_info(accessor, value, index, &scope, &parent_path, separator))
        .collect()
}

/// A frozen flatten pass plus its key -> position lookup map.
#[derive(Debug, Clone)]
pub struct FlatTree<T> {
    infos: Vec<FileInfo<T>>,
    positions: HashMap<String, usize>,
    separator: String,
}

impl<T: Clone> FlatTree<T> {
    pub fn build<A: FolderAccessor<T> + ?Sized>(
        roots: &[T],
        accessor: &A,
        folded: &PathSet,
        separator: &str,
    ) -> Self {
        Self::from_infos(flatten(roots, accessor, folded, separator), separator)
    }
}

impl<T> FlatTree<T> {
    pub fn from_infos(infos: Vec<FileInfo<T>>, separator: &str) -> Self {
        let positions = infos
            .iter()
            .enumerate()
            .map(|(ix, info)| (info.key.clone(), ix))
            .collect();
        Self {
            infos,
            positions,
            separator: separator.to_string(),
        }
    }

    #[inline]
    pub fn infos(&self) -> &[FileInfo<T>] {
        &self.infos
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    #[inline]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileInfo<T>> {
        self.infos.iter()
    }

    pub fn position(&self, path: &FilePath) -> Option<usize> {
        self.position_by_key(&path.key(&self.separator))
    }

    pub fn position_by_key(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn get(&self, path: &FilePath) -> Option<&FileInfo<T>> {
        self.position(path).map(|ix| &self.infos[ix])
    }

    pub fn get_by_key(&self, key: &str) -> Option<&FileInfo<T>> {
        self.position_by_key(key).map(|ix| &self.infos[ix])
    }

    pub fn at(&self, ix: usize) -> Option<&FileInfo<T>> {
        self.infos.get(ix)
    }

    /// Last visible child of `parent` in document order.
    pub fn last_child_of(&self, parent: &FilePath) -> Option<&FileInfo<T>> {
        self.infos
            .iter()
            .rev()
            .find(|info| info.parent_path == *parent)
    }

    /// Position one past the last visible descendant of the row at `ix`.
    pub fn subtree_end(&self, ix: usize) -> usize {
        let Some(start) = self.infos.get(ix) else {
            return self.infos.len();
        };
        let mut end = ix + 1;
        while end < self.infos.len() && self.infos[end].depth > start.depth {
            end += 1;
        }
        end
    }
}
