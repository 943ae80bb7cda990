use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::path::DEFAULT_PATH_SEPARATOR;
use crate::resolve::MoveCandidate;
use crate::session::PointerDown;

/// Plain settings of a folder view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderOptions {
    /// Indentation unit in pixels.
    pub gap: f32,
    /// Extra left offset added to every row's indent.
    pub gap_offset: f32,
    pub multiselect: bool,
    /// When `false` a pointer-down only ever selects.
    pub movable: bool,
    pub show_fold_icon: bool,
    pub path_separator: String,
    /// Distance from the container's right edge of the vertical hit-test line.
    pub probe_inset: f32,
}

impl Default for FolderOptions {
    fn default() -> Self {
        Self {
            gap: 15.,
            gap_offset: 0.,
            multiselect: false,
            movable: true,
            show_fold_icon: true,
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            probe_inset: 10.,
        }
    }
}

type CheckMoveFn<T> = Rc<dyn Fn(&MoveCandidate<T>) -> bool>;
type DragConditionFn = Rc<dyn Fn(&PointerDown) -> bool>;

/// [`FolderOptions`] plus the caller's policy hooks.
pub struct FolderConfig<T> {
    pub options: FolderOptions,
    check_move: CheckMoveFn<T>,
    drag_condition: DragConditionFn,
}

impl<T> FolderConfig<T> {
    pub fn new(options: FolderOptions) -> Self {
        Self {
            options,
            check_move: Rc::new(|_| true),
            drag_condition: Rc::new(|_| true),
        }
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.options.gap = gap;
        self
    }

    pub fn gap_offset(mut self, gap_offset: f32) -> Self {
        self.options.gap_offset = gap_offset;
        self
    }

    pub fn multiselect(mut self, multiselect: bool) -> Self {
        self.options.multiselect = multiselect;
        self
    }

    pub fn movable(mut self, movable: bool) -> Self {
        self.options.movable = movable;
        self
    }

    pub fn show_fold_icon(mut self, show: bool) -> Self {
        self.options.show_fold_icon = show;
        self
    }

    pub fn path_separator(mut self, separator: impl Into<String>) -> Self {
        self.options.path_separator = separator.into();
        self
    }

    /// Structural policy: return `false` to forbid a candidate, e.g. dropping into a leaf.
    pub fn on_check_move(mut self, f: impl Fn(&MoveCandidate<T>) -> bool + 'static) -> Self {
        self.check_move = Rc::new(f);
        self
    }

    /// Decide whether a pointer-down may start a gesture at all.
    pub fn on_drag_condition(mut self, f: impl Fn(&PointerDown) -> bool + 'static) -> Self {
        self.drag_condition = Rc::new(f);
        self
    }

    pub fn check_move(&self, candidate: &MoveCandidate<T>) -> bool {
        (self.check_move)(candidate)
    }

    pub fn allows_drag(&self, down: &PointerDown) -> bool {
        (self.drag_condition)(down)
    }
}

impl<T> Default for FolderConfig<T> {
    fn default() -> Self {
        Self::new(FolderOptions::default())
    }
}

impl<T> Clone for FolderConfig<T> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            check_move: self.check_move.clone(),
            drag_condition: self.drag_condition.clone(),
        }
    }
}

impl<T> std::fmt::Debug for FolderConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderConfig")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    #[test]
    fn options_fill_missing_fields() {
        let options: FolderOptions =
            serde_json::from_str(r#"{ "gap": 20.0, "multiselect": true }"#).unwrap();
        assert_eq!(options.gap, 20.);
        assert!(options.multiselect);
        assert!(options.movable);
        assert_eq!(options.path_separator, "///");
        assert_eq!(options.probe_inset, 10.);
    }

    #[test]
    fn hooks_default_to_allow() {
        let config = FolderConfig::<()>::default().gap(12.).movable(false);
        assert_eq!(config.options.gap, 12.);
        assert!(!config.options.movable);

        let candidate = MoveCandidate {
            depth: 0,
            parent: None,
            prev: None,
        };
        assert!(config.check_move(&candidate));
        assert!(config.allows_drag(&PointerDown::new(point(0., 0.), None)));

        let config = config.on_check_move(|candidate| candidate.depth > 0);
        assert!(!config.clone().check_move(&candidate));
    }
}
