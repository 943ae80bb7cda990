use crate::flatten::{FileInfo, FlatTree};
use crate::path::FilePath;
use crate::store::PathSet;

/// Modifier keys held during a click, passed explicitly with each event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    pub shift: bool,
}

/// Emitted when a click changes the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectEvent<T> {
    /// The clicked path.
    pub path: FilePath,
    /// Whether the clicked path is part of `selected`.
    pub is_selected: bool,
    /// The next selection, in document order.
    pub selected: PathSet,
    pub selected_infos: Vec<FileInfo<T>>,
}

/// Drop every path that lies under another path of the set.
pub fn prune_descendants(paths: &PathSet) -> PathSet {
    paths
        .iter()
        .filter(|path| !paths.iter().any(|other| path.is_descendant_of(other)))
        .cloned()
        .collect()
}

/// Resolve a click on `clicked` into the next selection.
///
/// Returns `None` when the cleaned-up selection equals `selected`.
pub fn resolve_click<T: Clone>(
    flat: &FlatTree<T>,
    selected: &PathSet,
    clicked: &FilePath,
    modifiers: ClickModifiers,
    multiselect: bool,
) -> Option<SelectEvent<T>> {
    let mut next = if multiselect && modifiers.shift {
        let mut next = selected.clone();
        next.toggle(clicked);
        next
    } else {
        PathSet::from_iter([clicked.clone()])
    };

    // Only visible rows can be selected, and the result follows document order.
    next = flat
        .iter()
        .filter(|info| next.contains(&info.path))
        .map(|info| info.path.clone())
        .collect();
    let next = prune_descendants(&next);

    if next == *selected {
        return None;
    }

    let selected_infos = next
        .iter()
        .filter_map(|path| flat.get(path).cloned())
        .collect();
    tracing::debug!(path = %clicked, count = next.len(), "selection changed");

    Some(SelectEvent {
        path: clicked.clone(),
        is_selected: next.contains(clicked),
        selected: next,
        selected_infos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::FolderAccessors;
    use crate::path::DEFAULT_PATH_SEPARATOR;

    #[derive(Clone, Debug)]
    struct Entry {
        name: &'static str,
        children: Vec<Entry>,
    }

    fn entry(name: &'static str, children: Vec<Entry>) -> Entry {
        Entry { name, children }
    }

    fn flat(folded: &PathSet) -> FlatTree<Entry> {
        let roots = vec![
            entry("a", vec![entry("a1", vec![]), entry("a2", vec![])]),
            entry("b", vec![]),
        ];
        let accessors = FolderAccessors::new()
            .id(|entry: &Entry, _, _| entry.name.to_string())
            .children(|entry, _| entry.children.as_slice());
        FlatTree::build(&roots, &accessors, folded, DEFAULT_PATH_SEPARATOR)
    }

    fn path(segments: &[&str]) -> FilePath {
        FilePath::new(segments.iter().copied())
    }

    fn set(paths: &[&[&str]]) -> PathSet {
        paths.iter().map(|p| path(p)).collect()
    }

    #[test]
    fn single_select_replaces() {
        let flat = flat(&PathSet::new());
        let shift = ClickModifiers { shift: true };

        let event = resolve_click(&flat, &set(&[&["a"]]), &path(&["b"]), shift, false).unwrap();
        assert_eq!(event.selected, set(&[&["b"]]));
        assert!(event.is_selected);
        assert_eq!(event.selected_infos.len(), 1);
    }

    #[test]
    fn shift_toggles_in_multiselect() {
        let flat = flat(&PathSet::new());
        let shift = ClickModifiers { shift: true };

        let event = resolve_click(&flat, &set(&[&["b"]]), &path(&["a", "a2"]), shift, true).unwrap();
        assert_eq!(event.selected, set(&[&["a", "a2"], &["b"]]));

        let event = resolve_click(&flat, &event.selected, &path(&["b"]), shift, true).unwrap();
        assert_eq!(event.selected, set(&[&["a", "a2"]]));
        assert!(!event.is_selected);

        let event = resolve_click(
            &flat,
            &event.selected,
            &path(&["b"]),
            ClickModifiers::default(),
            true,
        )
        .unwrap();
        assert_eq!(event.selected, set(&[&["b"]]));
    }

    #[test]
    fn ancestor_selection_absorbs_descendants() {
        let flat = flat(&PathSet::new());
        let shift = ClickModifiers { shift: true };

        let event = resolve_click(&flat, &set(&[&["a"]]), &path(&["a", "a1"]), shift, true);
        assert!(event.is_none(), "a1 is already covered by a");

        let event =
            resolve_click(&flat, &set(&[&["a", "a1"]]), &path(&["a"]), shift, true).unwrap();
        assert_eq!(event.selected, set(&[&["a"]]));
    }

    #[test]
    fn hidden_and_stale_paths_are_dropped() {
        let flat = flat(&set(&[&["a"]]));
        let shift = ClickModifiers { shift: true };

        let event =
            resolve_click(&flat, &set(&[&["a", "a1"]]), &path(&["b"]), shift, true).unwrap();
        assert_eq!(event.selected, set(&[&["b"]]));
    }

    #[test]
    fn unchanged_selection_is_suppressed() {
        let flat = flat(&PathSet::new());
        let event = resolve_click(
            &flat,
            &set(&[&["b"]]),
            &path(&["b"]),
            ClickModifiers::default(),
            true,
        );
        assert!(event.is_none());
    }
}
