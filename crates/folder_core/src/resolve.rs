use std::ops::RangeInclusive;

use crate::flatten::{FileInfo, FlatTree};
use crate::geometry::{Bounds, Point};
use crate::path::FilePath;
use crate::select::prune_descendants;
use crate::store::PathSet;

/// A proposed insertion point: after `prev` among `parent`'s children, or at the front of
/// them when `prev` is `None`. A `None` parent is the root list.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCandidate<T> {
    pub depth: usize,
    pub parent: Option<FileInfo<T>>,
    pub prev: Option<FileInfo<T>>,
}

impl<T> MoveCandidate<T> {
    pub fn parent_path(&self) -> FilePath {
        self.parent
            .as_ref()
            .map(|info| info.path.clone())
            .unwrap_or_default()
    }

    pub fn prev_path(&self) -> Option<&FilePath> {
        self.prev.as_ref().map(|info| &info.path)
    }

    /// `true` when the insertion point lies inside any of `selected`: the parent is a
    /// selected node or under one, or `prev` is strictly under one.
    ///
    /// A `prev` that is itself selected is not inside; the committer walks back past it.
    pub fn is_inside(&self, selected: &PathSet) -> bool {
        let parent_inside = self
            .parent
            .as_ref()
            .is_some_and(|parent| selected.covers(&parent.path));
        let prev_inside = self
            .prev_path()
            .is_some_and(|prev| selected.iter().any(|path| prev.is_descendant_of(path)));
        parent_inside || prev_inside
    }

    /// `true` when committing this candidate would leave every child list as it is.
    ///
    /// That is the case when all of `selected` already sits under this parent and the
    /// effective `prev` (after skipping selected siblings) is the sibling right before
    /// the selection's current position, with the selected siblings contiguous.
    pub fn is_noop(&self, flat: &FlatTree<T>, selected: &PathSet) -> bool {
        let selected = prune_descendants(selected);
        let parent_path = self.parent_path();
        let elsewhere = |path: &FilePath| {
            flat.get(path)
                .is_none_or(|info| info.parent_path != parent_path)
        };
        if selected.is_empty() || selected.iter().any(elsewhere) {
            return false;
        }

        let siblings: Vec<&FilePath> = flat
            .iter()
            .filter(|info| info.parent_path == parent_path)
            .map(|info| &info.path)
            .collect();

        let prev = match self.prev_path() {
            Some(prev) => {
                let Some(ix) = siblings.iter().position(|path| *path == prev) else {
                    return false;
                };
                siblings[..=ix]
                    .iter()
                    .rev()
                    .find(|path| !selected.contains(path))
                    .copied()
            }
            None => None,
        };

        let mut reordered: Vec<&FilePath> = siblings
            .iter()
            .copied()
            .filter(|path| !selected.contains(path))
            .collect();
        let at = prev
            .and_then(|prev| reordered.iter().position(|path| *path == prev))
            .map_or(0, |ix| ix + 1);
        let moved: Vec<&FilePath> = siblings
            .iter()
            .copied()
            .filter(|path| selected.contains(path))
            .collect();
        reordered.splice(at..at, moved);
        reordered == siblings
    }
}

/// Where to draw the insertion indicator, relative to the container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guideline {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

/// A rendered row found under a probe point.
#[derive(Debug, Clone, PartialEq)]
pub struct RowHit {
    pub path: FilePath,
    pub bounds: Bounds,
}

/// Hit-testing seam onto the rendering surface.
pub trait RowProbe {
    fn row_at(&self, point: Point) -> Option<RowHit>;
}

/// Fixed-height rows stacked from `origin`.
#[derive(Debug, Clone)]
pub struct UniformRows {
    origin: Point,
    width: f32,
    row_height: f32,
    paths: Vec<FilePath>,
}

impl UniformRows {
    /// `origin` is the top-left corner of the first row in pointer coordinates, already
    /// shifted by any scroll offset.
    pub fn new(origin: Point, width: f32, row_height: f32, paths: Vec<FilePath>) -> Self {
        Self {
            origin,
            width,
            row_height,
            paths,
        }
    }

    pub fn row_bounds(&self, ix: usize) -> Bounds {
        Bounds::new(
            self.origin.x,
            self.origin.y + self.row_height * ix as f32,
            self.width,
            self.row_height,
        )
    }

    pub fn index_at(&self, y: f32) -> Option<usize> {
        if !self.row_height.is_finite() || self.row_height <= 0.0 || y < self.origin.y {
            return None;
        }
        let ix = ((y - self.origin.y) / self.row_height).floor() as usize;
        (ix < self.paths.len()).then_some(ix)
    }
}

impl RowProbe for UniformRows {
    fn row_at(&self, point: Point) -> Option<RowHit> {
        if point.x < self.origin.x || point.x >= self.origin.x + self.width {
            return None;
        }
        let ix = self.index_at(point.y)?;
        Some(RowHit {
            path: self.paths[ix].clone(),
            bounds: self.row_bounds(ix),
        })
    }
}

/// Everything one resolve pass needs besides the row probe.
pub struct ResolveInput<'a, T> {
    pub pointer: Point,
    pub flat: &'a FlatTree<T>,
    pub container: Bounds,
    pub selected: &'a PathSet,
    pub gap: f32,
    pub probe_inset: f32,
    pub check_move: &'a dyn Fn(&MoveCandidate<T>) -> bool,
}

/// The outcome of a resolve pass that found a valid candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    pub candidate: MoveCandidate<T>,
    pub guideline: Guideline,
    pub is_top: bool,
    /// The row the drop point belongs to: the hovered row, or the one above it when the
    /// pointer is in the upper half.
    pub target: FileInfo<T>,
    /// Visible rows directly above and below the drop point.
    pub prev: Option<FileInfo<T>>,
    pub next: Option<FileInfo<T>>,
}

/// Enumerate structurally possible insertion points between two adjacent visible rows.
///
/// Returns the candidates together with the depth range they span. Where several depths
/// exist, deeper candidates come first.
pub fn enumerate_candidates<T: Clone>(
    flat: &FlatTree<T>,
    prev: Option<&FileInfo<T>>,
    next: Option<&FileInfo<T>>,
) -> (Vec<MoveCandidate<T>>, RangeInclusive<usize>) {
    let parent_at = |path: &FilePath, depth: usize| -> Option<Option<FileInfo<T>>> {
        if depth == 0 {
            return Some(None);
        }
        flat.get(&path.prefix(depth)).cloned().map(Some)
    };

    let Some(prev) = prev else {
        let candidate = MoveCandidate {
            depth: 0,
            parent: None,
            prev: None,
        };
        return (vec![candidate], 0..=0);
    };

    let Some(next) = next else {
        // End of the list: close any number of open groups, down to the root.
        let range = 0..=prev.depth + 1;
        let candidates = range
            .clone()
            .rev()
            .filter_map(|depth| {
                let parent = parent_at(&prev.path, depth)?;
                let last = flat.last_child_of(&prev.path.prefix(depth)).cloned();
                Some(MoveCandidate {
                    depth,
                    parent,
                    prev: last,
                })
            })
            .collect();
        return (candidates, range);
    };

    if prev.depth == next.depth {
        let sibling = parent_at(&prev.path, prev.depth).map(|parent| MoveCandidate {
            depth: prev.depth,
            parent,
            prev: Some(prev.clone()),
        });
        let first_child = MoveCandidate {
            depth: prev.depth + 1,
            parent: Some(prev.clone()),
            prev: None,
        };
        let candidates = sibling.into_iter().chain([first_child]).collect();
        (candidates, prev.depth..=prev.depth + 1)
    } else if prev.depth < next.depth {
        let candidate = MoveCandidate {
            depth: next.depth,
            parent: Some(prev.clone()),
            prev: None,
        };
        (vec![candidate], next.depth..=next.depth)
    } else {
        let range = next.depth..=prev.depth + 1;
        let candidates = range
            .clone()
            .rev()
            .filter_map(|depth| {
                let parent = parent_at(&prev.path, depth)?;
                let anchor = if depth > prev.depth {
                    None
                } else {
                    Some(flat.get(&prev.path.prefix(depth + 1))?.clone())
                };
                Some(MoveCandidate {
                    depth,
                    parent,
                    prev: anchor,
                })
            })
            .collect();
        (candidates, range)
    }
}

/// The depth the pointer's horizontal position asks for, clamped to `range`.
pub fn desired_depth(
    pointer_x: f32,
    container: Bounds,
    target_depth: usize,
    gap: f32,
    range: &RangeInclusive<usize>,
) -> usize {
    if !gap.is_finite() || gap <= 0.0 || !pointer_x.is_finite() {
        return target_depth.clamp(*range.start(), *range.end());
    }
    let indent = (target_depth + 1) as f32 * gap;
    let distance = pointer_x - container.left - indent;
    let depth = target_depth as f32 + (distance / gap).round();
    (depth.max(0.0) as usize).clamp(*range.start(), *range.end())
}

pub fn guideline_for(depth: usize, row: Bounds, is_top: bool, container: Bounds, gap: f32) -> Guideline {
    let x = if depth > 0 {
        (depth + 1) as f32 * gap
    } else {
        0.0
    };
    let y = if is_top { row.top } else { row.bottom() } - container.top;
    Guideline {
        x,
        y,
        width: (container.width - x).max(0.0),
    }
}

/// One full resolve pass from the latest pointer position.
pub fn resolve_target<T: Clone, P: RowProbe + ?Sized>(
    input: &ResolveInput<'_, T>,
    probe: &P,
) -> Option<Resolution<T>> {
    let flat = input.flat;
    let probe_point = Point {
        x: input.container.right() - input.probe_inset,
        y: input.pointer.y,
    };
    let hit = probe.row_at(probe_point)?;
    let Some(target_ix) = flat.position(&hit.path) else {
        tracing::debug!(path = %hit.path, "hit row is not part of the drag snapshot");
        return None;
    };
    let hit_info = flat.at(target_ix)?;
    let is_top = input.pointer.y < hit.bounds.center_y();

    let (prev, next) = if is_top {
        (target_ix.checked_sub(1).and_then(|ix| flat.at(ix)), Some(hit_info))
    } else {
        (Some(hit_info), flat.at(target_ix + 1))
    };
    // Upper half of a row is the same slot as the lower half of the row above.
    let target = prev.unwrap_or(hit_info).clone();

    let (candidates, range) = enumerate_candidates(flat, prev, next);
    let enumerated = candidates.len();
    let candidates: Vec<_> = candidates
        .into_iter()
        .filter(|candidate| !candidate.is_inside(input.selected))
        .filter(|candidate| !candidate.is_noop(flat, input.selected))
        .filter(|candidate| (input.check_move)(candidate))
        .collect();

    let depth = desired_depth(input.pointer.x, input.container, target.depth, input.gap, &range);
    let candidate = candidates
        .into_iter()
        .min_by_key(|candidate| candidate.depth.abs_diff(depth))?;
    tracing::trace!(
        target = %target.path,
        is_top,
        enumerated,
        desired = depth,
        chosen = candidate.depth,
        "resolved drop candidate"
    );

    let guideline = guideline_for(candidate.depth, hit.bounds, is_top, input.container, input.gap);
    Some(Resolution {
        candidate,
        guideline,
        is_top,
        prev: prev.cloned(),
        next: next.cloned(),
        target,
    })
}
