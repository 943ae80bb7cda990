use crate::accessor::FolderAccessor;
use crate::error::FolderError;
use crate::flatten::{FileInfo, FlatTree, children_infos};
use crate::path::FilePath;
use crate::resolve::MoveCandidate;
use crate::select::prune_descendants;
use crate::store::PathSet;

/// Describes a committed move. The tree owner applies it: replace the children of
/// `parent` (or the root list) with `children`, and drop the moved nodes from wherever
/// else they used to live.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEvent<T> {
    pub depth: usize,
    pub parent: Option<FileInfo<T>>,
    /// The sibling the selection now follows, after skipping selected siblings.
    pub prev: Option<FileInfo<T>>,
    /// Nearest visible row above the drop point that is not being moved.
    pub flatten_prev: Option<FileInfo<T>>,
    /// The new child list of `parent`.
    pub children: Vec<T>,
    /// `children` as records; moved entries still carry their pre-move paths.
    pub children_infos: Vec<FileInfo<T>>,
    pub selected: PathSet,
    pub selected_infos: Vec<FileInfo<T>>,
    /// The next fold set, with folded paths under moved nodes rebased.
    pub folded: PathSet,
}

impl<T> MoveEvent<T> {
    pub fn parent_path(&self) -> FilePath {
        self.parent
            .as_ref()
            .map(|info| info.path.clone())
            .unwrap_or_default()
    }

    pub fn prev_path(&self) -> Option<&FilePath> {
        self.prev.as_ref().map(|info| &info.path)
    }

    pub fn selected_values(&self) -> impl Iterator<Item = &T> {
        self.selected_infos.iter().map(|info| &info.value)
    }
}

/// Walk up from `row` past every row that is part of the moving selection.
pub fn nearest_unmoved_row<'a, T>(
    flat: &'a FlatTree<T>,
    selected: &PathSet,
    row: Option<&FilePath>,
) -> Option<&'a FileInfo<T>> {
    let ix = flat.position(row?)?;
    flat.infos()[..=ix]
        .iter()
        .rev()
        .find(|info| !selected.covers(&info.path))
}

/// Rebuild the child list of `candidate.parent` with the selection spliced in after
/// `candidate.prev`.
///
/// `row_above` is the visible row directly above the drop point, if any.
pub fn commit_move<T: Clone, A: FolderAccessor<T> + ?Sized>(
    roots: &[T],
    accessor: &A,
    flat: &FlatTree<T>,
    candidate: &MoveCandidate<T>,
    selected: &PathSet,
    folded: &PathSet,
    row_above: Option<&FilePath>,
) -> Result<MoveEvent<T>, FolderError> {
    let selected = prune_descendants(selected);
    if selected.is_empty() {
        return Err(FolderError::EmptySelection);
    }
    if candidate.is_inside(&selected) {
        return Err(FolderError::IntoSelection(candidate.parent_path().to_string()));
    }

    let mut selected_infos = selected
        .iter()
        .map(|path| {
            flat.position(path)
                .map(|ix| (ix, &flat.infos()[ix]))
                .ok_or_else(|| FolderError::MissingPath(path.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    selected_infos.sort_by_key(|(ix, _)| *ix);
    let selected_infos: Vec<FileInfo<T>> = selected_infos
        .into_iter()
        .map(|(_, info)| info.clone())
        .collect();

    let parent = match &candidate.parent {
        Some(parent) => Some(
            flat.get(&parent.path)
                .ok_or_else(|| FolderError::MissingPath(parent.path.to_string()))?,
        ),
        None => None,
    };
    let siblings = children_infos(roots, accessor, parent, flat.separator());

    let prev = candidate.prev_path().and_then(|prev| {
        let ix = siblings.iter().position(|info| info.path == *prev)?;
        siblings[..=ix]
            .iter()
            .rev()
            .find(|info| !selected.contains(&info.path))
            .cloned()
    });

    let mut children_infos: Vec<FileInfo<T>> = siblings
        .into_iter()
        .filter(|info| !selected.contains(&info.path))
        .collect();
    let at = match &prev {
        Some(prev) => children_infos
            .iter()
            .position(|info| info.path == prev.path)
            .map_or(0, |ix| ix + 1),
        None => 0,
    };
    children_infos.splice(at..at, selected_infos.iter().cloned());

    let parent_path = candidate.parent_path();
    let folded = folded
        .iter()
        .map(|path| {
            selected_infos
                .iter()
                .find_map(|info| path.rebase(&info.path, &parent_path.child(info.id.clone())))
                .unwrap_or_else(|| path.clone())
        })
        .collect();

    let flatten_prev = nearest_unmoved_row(flat, &selected, row_above).cloned();
    tracing::debug!(
        parent = %parent_path,
        prev = ?prev.as_ref().map(|info| info.path.to_string()),
        depth = candidate.depth,
        moved = selected_infos.len(),
        "commit move"
    );

    Ok(MoveEvent {
        depth: candidate.depth,
        parent: parent.cloned(),
        prev,
        flatten_prev,
        children: children_infos.iter().map(|info| info.value.clone()).collect(),
        children_infos,
        selected,
        selected_infos,
        folded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::FolderAccessors;
    use crate::path::DEFAULT_PATH_SEPARATOR;

    #[derive(Clone, Debug, PartialEq)]
    struct Entry {
        name: &'static str,
        children: Vec<Entry>,
    }

    fn entry(name: &'static str, children: Vec<Entry>) -> Entry {
        Entry { name, children }
    }

    fn accessors() -> FolderAccessors<Entry> {
        FolderAccessors::new()
            .id(|entry: &Entry, _, _| entry.name.to_string())
            .children(|entry, _| entry.children.as_slice())
    }

    fn path(segments: &[&str]) -> FilePath {
        FilePath::new(segments.iter().copied())
    }

    fn names(event: &MoveEvent<Entry>) -> Vec<&'static str> {
        event.children.iter().map(|entry| entry.name).collect()
    }

    fn demo() -> Vec<Entry> {
        vec![
            entry("a", vec![]),
            entry(
                "b",
                vec![entry("b1", vec![entry("x", vec![])]), entry("b2", vec![])],
            ),
            entry("c", vec![]),
        ]
    }

    /// An empty slice stands for the root list or the front slot.
    fn candidate(flat: &FlatTree<Entry>, parent: &[&str], prev: &[&str]) -> MoveCandidate<Entry> {
        let lookup = |segments: &[&str]| {
            (!segments.is_empty()).then(|| flat.get(&path(segments)).unwrap().clone())
        };
        MoveCandidate {
            depth: parent.len(),
            parent: lookup(parent),
            prev: lookup(prev),
        }
    }

    #[test]
    fn move_into_group() {
        let roots = demo();
        let accessors = accessors();
        let flat = FlatTree::build(&roots, &accessors, &PathSet::new(), DEFAULT_PATH_SEPARATOR);
        let selected = PathSet::from_iter([path(&["a"])]);

        let candidate = candidate(&flat, &["b"], &["b", "b1"]);
        let event = commit_move(
            &roots,
            &accessors,
            &flat,
            &candidate,
            &selected,
            &PathSet::new(),
            Some(&path(&["b", "b1", "x"])),
        )
        .unwrap();

        assert_eq!(names(&event), ["b1", "a", "b2"]);
        assert_eq!(event.parent_path(), path(&["b"]));
        assert_eq!(event.prev_path(), Some(&path(&["b", "b1"])));
        assert_eq!(
            event.flatten_prev.clone().map(|info| info.path),
            Some(path(&["b", "b1", "x"]))
        );
        let moved: Vec<_> = event.selected_values().map(|entry| entry.name).collect();
        assert_eq!(moved, ["a"]);
    }

    #[test]
    fn front_insert_and_root_reorder() {
        let roots = demo();
        let accessors = accessors();
        let flat = FlatTree::build(&roots, &accessors, &PathSet::new(), DEFAULT_PATH_SEPARATOR);
        let selected = PathSet::from_iter([path(&["c"]), path(&["a"])]);

        let event = commit_move(
            &roots,
            &accessors,
            &flat,
            &candidate(&flat, &[], &[]),
            &selected,
            &PathSet::new(),
            None,
        )
        .unwrap();
        assert_eq!(names(&event), ["a", "c", "b"]);
        assert!(event.flatten_prev.is_none());

        let event = commit_move(
            &roots,
            &accessors,
            &flat,
            &candidate(&flat, &[], &["b"]),
            &PathSet::from_iter([path(&["a"])]),
            &PathSet::new(),
            Some(&path(&["b", "b2"])),
        )
        .unwrap();
        assert_eq!(names(&event), ["b", "a", "c"]);
    }

    #[test]
    fn selected_prev_walks_back() {
        let roots = vec![
            entry("a", vec![]),
            entry("b", vec![]),
            entry("c", vec![]),
            entry("d", vec![]),
        ];
        let accessors = accessors();
        let flat = FlatTree::build(&roots, &accessors, &PathSet::new(), DEFAULT_PATH_SEPARATOR);
        let selected = PathSet::from_iter([path(&["b"]), path(&["c"])]);

        // After c, which is itself moving: the slot collapses to "after a".
        let event = commit_move(
            &roots,
            &accessors,
            &flat,
            &candidate(&flat, &[], &["c"]),
            &selected,
            &PathSet::new(),
            Some(&path(&["c"])),
        )
        .unwrap();
        assert_eq!(names(&event), ["a", "b", "c", "d"]);
        assert_eq!(event.prev_path(), Some(&path(&["a"])));
        assert_eq!(event.flatten_prev.map(|info| info.path), Some(path(&["a"])));

        // Every earlier sibling is moving: insert at the front.
        let selected = PathSet::from_iter([path(&["a"]), path(&["d"])]);
        let event = commit_move(
            &roots,
            &accessors,
            &flat,
            &candidate(&flat, &[], &["a"]),
            &selected,
            &PathSet::new(),
            Some(&path(&["a"])),
        )
        .unwrap();
        assert_eq!(names(&event), ["a", "d", "b", "c"]);
        assert!(event.prev.is_none());
    }

    #[test]
    fn folded_paths_follow_moved_nodes() {
        let roots = demo();
        let accessors = accessors();
        let folded = PathSet::from_iter([path(&["b", "b1"]), path(&["c"])]);
        let flat = FlatTree::build(&roots, &accessors, &folded, DEFAULT_PATH_SEPARATOR);
        let selected = PathSet::from_iter([path(&["b", "b1"])]);

        let event = commit_move(
            &roots,
            &accessors,
            &flat,
            &candidate(&flat, &[], &["a"]),
            &selected,
            &folded,
            Some(&path(&["a"])),
        )
        .unwrap();
        assert_eq!(names(&event), ["a", "b1", "b", "c"]);
        assert_eq!(
            event.folded,
            PathSet::from_iter([path(&["b1"]), path(&["c"])])
        );
    }

    #[test]
    fn rejects_bad_input() {
        let roots = demo();
        let accessors = accessors();
        let flat = FlatTree::build(&roots, &accessors, &PathSet::new(), DEFAULT_PATH_SEPARATOR);
        let root_front = candidate(&flat, &[], &[]);

        let err = commit_move(
            &roots,
            &accessors,
            &flat,
            &root_front,
            &PathSet::new(),
            &PathSet::new(),
            None,
        )
        .unwrap_err();
        assert_eq!(err, FolderError::EmptySelection);

        let err = commit_move(
            &roots,
            &accessors,
            &flat,
            &root_front,
            &PathSet::from_iter([path(&["gone"])]),
            &PathSet::new(),
            None,
        )
        .unwrap_err();
        assert_eq!(err, FolderError::MissingPath("gone".into()));

        let err = commit_move(
            &roots,
            &accessors,
            &flat,
            &candidate(&flat, &["b", "b1"], &[]),
            &PathSet::from_iter([path(&["b"])]),
            &PathSet::new(),
            None,
        )
        .unwrap_err();
        assert_eq!(err, FolderError::IntoSelection("b/b1".into()));
    }
}
