use crate::accessor::FolderAccessor;
use crate::commit::{MoveEvent, commit_move};
use crate::config::FolderConfig;
use crate::error::FolderError;
use crate::flatten::{FileInfo, FlatTree};
use crate::geometry::{Bounds, Point};
use crate::path::FilePath;
use crate::resolve::{Guideline, MoveCandidate, Resolution, ResolveInput, RowProbe, resolve_target};
use crate::select::{ClickModifiers, SelectEvent, resolve_click};
use crate::store::{FoldEvent, PathSet, toggle_fold};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Pointer is down; the host has not confirmed a drag yet.
    Armed,
    Dragging,
    Resolved,
    NoTarget,
    Committed,
    Cancelled,
}

impl DragPhase {
    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging | Self::Resolved | Self::NoTarget)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        *self == Self::Armed || self.is_dragging()
    }
}

/// A pointer-down as seen by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerDown {
    pub position: Point,
    /// The row under the pointer, if any.
    pub target: Option<FilePath>,
    pub modifiers: ClickModifiers,
    pub on_fold_icon: bool,
}

impl PointerDown {
    pub fn new(position: Point, target: Option<FilePath>) -> Self {
        Self {
            position,
            target,
            modifiers: ClickModifiers::default(),
            on_fold_icon: false,
        }
    }

    pub fn modifiers(mut self, modifiers: ClickModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn on_fold_icon(mut self, on_fold_icon: bool) -> Self {
        self.on_fold_icon = on_fold_icon;
        self
    }
}

/// Everything a gesture proposes to the owner of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FolderEvent<T> {
    Select(SelectEvent<T>),
    Fold(FoldEvent),
    Move(MoveEvent<T>),
}

/// The caller-owned state a gesture starts from.
pub struct FolderTree<'a, T, A: ?Sized> {
    pub roots: &'a [T],
    pub accessor: &'a A,
    pub selected: &'a PathSet,
    pub folded: &'a PathSet,
}

impl<T, A: ?Sized> Clone for FolderTree<'_, T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A: ?Sized> Copy for FolderTree<'_, T, A> {}

/// Lifecycle of one pointer gesture over a folder view.
///
/// The flattened snapshot is taken at pointer-down and stays frozen until the gesture
/// ends, so every resolve pass of a drag sees the same tree.
pub struct DragSession<T> {
    config: FolderConfig<T>,
    phase: DragPhase,
    flat: Option<FlatTree<T>>,
    container: Bounds,
    offset_x: f32,
    /// Where the gesture was pressed; the shadow offset is measured from here.
    press: Point,
    pointer: Point,
    target: Option<FilePath>,
    modifiers: ClickModifiers,
    selected: PathSet,
    folded: PathSet,
    selected_on_down: bool,
    resolution: Option<Resolution<T>>,
}

impl<T: Clone> DragSession<T> {
    pub fn new(config: FolderConfig<T>) -> Self {
        Self {
            config,
            phase: DragPhase::Idle,
            flat: None,
            container: Bounds::default(),
            offset_x: 0.,
            press: Point::default(),
            pointer: Point::default(),
            target: None,
            modifiers: ClickModifiers::default(),
            selected: PathSet::new(),
            folded: PathSet::new(),
            selected_on_down: false,
            resolution: None,
        }
    }

    pub fn config(&self) -> &FolderConfig<T> {
        &self.config
    }

    pub fn set_config(&mut self, config: FolderConfig<T>) {
        self.config = config;
    }

    #[inline]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.phase.is_dragging()
    }

    /// The selection the gesture is working with, including a selection made by the
    /// pointer-down itself.
    pub fn selected(&self) -> &PathSet {
        &self.selected
    }

    pub fn snapshot(&self) -> Option<&FlatTree<T>> {
        self.flat.as_ref()
    }

    pub fn resolution(&self) -> Option<&Resolution<T>> {
        self.resolution.as_ref()
    }

    pub fn candidate(&self) -> Option<&MoveCandidate<T>> {
        self.resolution.as_ref().map(|resolution| &resolution.candidate)
    }

    pub fn guideline(&self) -> Option<Guideline> {
        self.resolution.as_ref().map(|resolution| resolution.guideline)
    }

    /// Where the dragged rows should be drawn, relative to the container.
    pub fn shadow_position(&self) -> Option<Point> {
        self.is_dragging().then(|| Point {
            x: self.pointer.x - self.container.left - self.offset_x,
            y: self.pointer.y - self.container.top,
        })
    }

    /// The rows being dragged, in document order.
    pub fn shadows(&self) -> Vec<&FileInfo<T>> {
        match (&self.flat, self.is_dragging()) {
            (Some(flat), true) => flat
                .iter()
                .filter(|info| self.selected.contains(&info.path))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn cancel(&mut self) {
        self.phase = DragPhase::Cancelled;
        self.clear();
    }

    fn clear(&mut self) {
        self.flat = None;
        self.resolution = None;
        self.target = None;
        self.selected_on_down = false;
    }

    /// Start a gesture. Returns the event the press produces by itself, if any.
    pub fn pointer_down<A: FolderAccessor<T> + ?Sized>(
        &mut self,
        tree: FolderTree<'_, T, A>,
        down: PointerDown,
    ) -> Option<FolderEvent<T>> {
        if self.is_active() {
            tracing::warn!(phase = ?self.phase, "pointer down during an active gesture");
            self.clear();
        }
        self.phase = DragPhase::Armed;
        self.press = down.position;
        self.pointer = down.position;
        self.modifiers = down.modifiers;
        self.selected = tree.selected.clone();
        self.folded = tree.folded.clone();
        self.selected_on_down = false;
        self.resolution = None;

        let Some(target) = down.target.clone() else {
            self.cancel();
            return None;
        };

        if down.on_fold_icon {
            let event = toggle_fold(tree.folded, &target);
            self.cancel();
            return Some(FolderEvent::Fold(event));
        }

        let multiselect = self.config.options.multiselect;
        let flat = FlatTree::build(
            tree.roots,
            tree.accessor,
            tree.folded,
            &self.config.options.path_separator,
        );
        if flat.get(&target).is_none() {
            tracing::debug!(path = %target, "pointer down on a row missing from the tree");
            self.cancel();
            return None;
        }

        if !self.config.options.movable {
            let event = resolve_click(&flat, &self.selected, &target, down.modifiers, multiselect);
            self.cancel();
            return event.map(FolderEvent::Select);
        }

        if !self.config.allows_drag(&down) {
            tracing::trace!(path = %target, "drag condition rejected pointer down");
            self.cancel();
            return None;
        }

        let mut event = None;
        if !self.selected.contains(&target) {
            event = resolve_click(&flat, &self.selected, &target, down.modifiers, multiselect);
            if let Some(event) = &event {
                self.selected = event.selected.clone();
                self.selected_on_down = true;
            }
        }

        tracing::trace!(path = %target, rows = flat.len(), "armed");
        self.flat = Some(flat);
        self.target = Some(target);
        event.map(FolderEvent::Select)
    }

    /// Confirm the armed gesture as a drag. `container` is the list's bounds in pointer
    /// coordinates.
    pub fn begin_drag(&mut self, container: Bounds) -> Result<(), FolderError> {
        if self.phase != DragPhase::Armed {
            return Err(FolderError::NotDragging);
        }
        if self.selected.is_empty() {
            self.cancel();
            return Err(FolderError::EmptySelection);
        }
        self.container = container;
        self.offset_x = self.press.x - container.left;
        self.phase = DragPhase::Dragging;
        tracing::debug!(selected = self.selected.len(), "drag started");
        Ok(())
    }

    /// Re-resolve the drop point from the latest pointer position.
    ///
    /// Ignored unless a drag has been started with [`DragSession::begin_drag`].
    pub fn pointer_move<P: RowProbe + ?Sized>(
        &mut self,
        position: Point,
        probe: &P,
    ) -> Option<Guideline> {
        self.pointer = position;
        if !self.is_dragging() {
            return None;
        }
        let flat = self.flat.as_ref()?;

        let check_move = |candidate: &MoveCandidate<T>| self.config.check_move(candidate);
        let input = ResolveInput {
            pointer: position,
            flat,
            container: self.container,
            selected: &self.selected,
            gap: self.config.options.gap,
            probe_inset: self.config.options.probe_inset,
            check_move: &check_move,
        };
        let resolution = resolve_target(&input, probe);

        self.phase = if resolution.is_some() {
            DragPhase::Resolved
        } else {
            DragPhase::NoTarget
        };
        self.resolution = resolution;
        self.guideline()
    }

    /// Finish the gesture. `roots` and `accessor` must describe the same tree the gesture
    /// started from.
    pub fn release<A: FolderAccessor<T> + ?Sized>(
        &mut self,
        roots: &[T],
        accessor: &A,
    ) -> Option<FolderEvent<T>> {
        let event = match (self.phase, &self.flat) {
            (DragPhase::Resolved, Some(flat)) => self.resolution.as_ref().and_then(|resolution| {
                let row_above = resolution.prev.as_ref().map(|info| &info.path);
                match commit_move(
                    roots,
                    accessor,
                    flat,
                    &resolution.candidate,
                    &self.selected,
                    &self.folded,
                    row_above,
                ) {
                    Ok(event) => Some(FolderEvent::Move(event)),
                    Err(err) => {
                        tracing::warn!(%err, "move could not be committed");
                        None
                    }
                }
            }),
            (DragPhase::Armed, Some(flat)) if !self.selected_on_down => {
                let multiselect = self.config.options.multiselect;
                self.target.as_ref().and_then(|target| {
                    resolve_click(flat, &self.selected, target, self.modifiers, multiselect)
                        .map(FolderEvent::Select)
                })
            }
            _ => None,
        };

        self.phase = match &event {
            Some(FolderEvent::Move(_)) => DragPhase::Committed,
            _ => DragPhase::Cancelled,
        };
        tracing::debug!(phase = ?self.phase, "gesture finished");
        self.clear();
        event
    }

    /// Discard the gesture without emitting anything.
    pub fn abort(&mut self) {
        if self.is_active() {
            tracing::debug!(phase = ?self.phase, "gesture aborted");
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::FolderAccessors;
    use crate::geometry::point;
    use crate::resolve::UniformRows;

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

    fn roots() -> Vec<Entry> {
        vec![
            entry("a", vec![]),
            entry("b", vec![entry("b1", vec![]), entry("b2", vec![])]),
        ]
    }

    fn down_on(segments: &[&str]) -> PointerDown {
        PointerDown::new(point(20., 5.), Some(path(segments)))
    }

    #[test]
    fn fold_icon_toggles_and_cancels() {
        let roots = roots();
        let accessors = accessors();
        let mut session = DragSession::new(FolderConfig::default());
        let tree = FolderTree {
            roots: &roots,
            accessor: &accessors,
            selected: &PathSet::new(),
            folded: &PathSet::new(),
        };

        let event = session.pointer_down(tree, down_on(&["b"]).on_fold_icon(true));
        match event {
            Some(FolderEvent::Fold(event)) => {
                assert!(event.is_folded);
                assert_eq!(event.folded, PathSet::from_iter([path(&["b"])]));
            }
            other => panic!("expected fold event, got {other:?}"),
        }
        assert_eq!(session.phase(), DragPhase::Cancelled);
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn press_selects_unselected_row_once() {
        let roots = roots();
        let accessors = accessors();
        let mut session = DragSession::new(FolderConfig::default());
        let tree = FolderTree {
            roots: &roots,
            accessor: &accessors,
            selected: &PathSet::new(),
            folded: &PathSet::new(),
        };

        let event = session.pointer_down(tree, down_on(&["a"]));
        assert!(matches!(event, Some(FolderEvent::Select(_))));
        assert_eq!(session.phase(), DragPhase::Armed);
        assert_eq!(session.selected(), &PathSet::from_iter([path(&["a"])]));

        // Released without dragging: the press already selected.
        assert!(session.release(&roots, &accessors).is_none());
        assert_eq!(session.phase(), DragPhase::Cancelled);
    }

    #[test]
    fn click_on_selected_row_resolves_on_release() {
        let roots = roots();
        let accessors = accessors();
        let mut session = DragSession::new(FolderConfig::default().multiselect(true));
        let selected = PathSet::from_iter([path(&["a"]), path(&["b"])]);
        let tree = FolderTree {
            roots: &roots,
            accessor: &accessors,
            selected: &selected,
            folded: &PathSet::new(),
        };

        assert!(session.pointer_down(tree, down_on(&["a"])).is_none());
        match session.release(&roots, &accessors) {
            Some(FolderEvent::Select(event)) => {
                assert_eq!(event.selected, PathSet::from_iter([path(&["a"])]));
            }
            other => panic!("expected select event, got {other:?}"),
        }
    }

    #[test]
    fn not_movable_only_selects() {
        let roots = roots();
        let accessors = accessors();
        let mut session = DragSession::new(FolderConfig::default().movable(false));
        let tree = FolderTree {
            roots: &roots,
            accessor: &accessors,
            selected: &PathSet::new(),
            folded: &PathSet::new(),
        };

        let event = session.pointer_down(tree, down_on(&["b", "b1"]));
        assert!(matches!(event, Some(FolderEvent::Select(_))));
        assert_eq!(session.phase(), DragPhase::Cancelled);
        assert_eq!(
            session.begin_drag(Bounds::new(0., 0., 300., 80.)),
            Err(FolderError::NotDragging)
        );
    }

    #[test]
    fn drag_condition_cancels_without_selecting() {
        let roots = roots();
        let accessors = accessors();
        let config = FolderConfig::default().on_drag_condition(|down| !down.modifiers.shift);
        let mut session = DragSession::new(config);
        let tree = FolderTree {
            roots: &roots,
            accessor: &accessors,
            selected: &PathSet::new(),
            folded: &PathSet::new(),
        };

        let down = down_on(&["a"]).modifiers(ClickModifiers { shift: true });
        assert!(session.pointer_down(tree, down).is_none());
        assert_eq!(session.phase(), DragPhase::Cancelled);
    }

    #[test]
    fn moves_before_begin_drag_are_ignored() {
        let roots = roots();
        let accessors = accessors();
        let mut session = DragSession::new(FolderConfig::default());
        let selected = PathSet::from_iter([path(&["a"])]);
        let tree = FolderTree {
            roots: &roots,
            accessor: &accessors,
            selected: &selected,
            folded: &PathSet::new(),
        };
        let flat = FlatTree::build(&roots, &accessors, &PathSet::new(), "///");
        let rows = UniformRows::new(
            point(0., 0.),
            300.,
            20.,
            flat.iter().map(|info| info.path.clone()).collect(),
        );

        session.pointer_down(tree, down_on(&["a"]));
        assert!(session.pointer_move(point(40., 55.), &rows).is_none());
        assert_eq!(session.phase(), DragPhase::Armed);

        session.begin_drag(Bounds::new(0., 0., 300., 80.)).unwrap();
        assert!(session.pointer_move(point(40., 55.), &rows).is_some());
        assert_eq!(session.phase(), DragPhase::Resolved);
        assert_eq!(session.shadows().len(), 1);
        assert_eq!(session.shadow_position(), Some(point(20., 55.)));

        session.abort();
        assert_eq!(session.phase(), DragPhase::Cancelled);
        assert!(session.guideline().is_none());
        assert!(session.shadows().is_empty());
        assert!(session.release(&roots, &accessors).is_none());
    }

    #[test]
    fn pointer_down_on_empty_space_cancels() {
        let roots = roots();
        let accessors = accessors();
        let mut session = DragSession::new(FolderConfig::default());
        let tree = FolderTree {
            roots: &roots,
            accessor: &accessors,
            selected: &PathSet::new(),
            folded: &PathSet::new(),
        };

        assert!(session.pointer_down(tree, PointerDown::new(point(0., 500.), None)).is_none());
        assert_eq!(session.phase(), DragPhase::Cancelled);

        assert!(session.pointer_down(tree, down_on(&["zzz"])).is_none());
        assert_eq!(session.phase(), DragPhase::Cancelled);
    }
}
