use std::{ops::Range, rc::Rc};

use gpui::{
    App, AppContext as _, Bounds, Component, Context, ElementId, Entity, EventEmitter,
    FocusHandle, InteractiveElement as _, IntoElement, ListSizingBehavior, MouseDownEvent,
    MouseMoveEvent, ParentElement as _, Pixels, Point, Render, RenderOnce, SharedString,
    StyleRefinement, Styled, Subscription, UniformListScrollHandle, Window, div,
    prelude::FluentBuilder as _, px, uniform_list,
};
use gpui_component::list::ListItem;
use gpui_component::scroll::{Scrollbar, ScrollbarState};
use gpui_component::{ActiveTheme as _, StyledExt as _, v_flex};
use gpui_folder_core::{
    ClickModifiers, DEFAULT_PATH_SEPARATOR, DragPhase, DragSession, FileInfo, FlatTree,
    FolderAccessor, FolderAccessors, FolderConfig, FolderEvent, FolderOptions, FolderTree,
    PathSet, PointerDown, UniformRows,
};

use crate::element::FolderPointerElement;

const CONTEXT: &str = "Folder";
const DRAG_THRESHOLD: f32 = 4.;
const DEFAULT_ROW_HEIGHT: f32 = 28.;

type RenderItemFn<T> =
    Rc<dyn Fn(usize, &FileInfo<T>, FolderRowState, &mut Window, &mut App) -> ListItem>;

/// Create a [`Folder`].
pub fn folder<T, R>(state: &Entity<FolderState<T>>, render_item: R) -> Folder<T>
where
    T: Clone + 'static,
    R: Fn(usize, &FileInfo<T>, FolderRowState, &mut Window, &mut App) -> ListItem + 'static,
{
    Folder::new(state, render_item)
}

/// What a row renderer needs to know about its row.
///
/// The fold icon is hit-tested in the indent slot right before the row's content:
/// `[indent, indent + gap)` from the list's left edge. Renderers should draw their
/// chevron there.
#[derive(Clone, Copy, Debug, Default)]
pub struct FolderRowState {
    pub selected: bool,
    /// Part of the selection currently being dragged.
    pub dragging: bool,
    pub folded: bool,
    pub has_children: bool,
    pub show_fold_icon: bool,
    pub indent: Pixels,
    pub gap: Pixels,
}

fn to_point(position: Point<Pixels>) -> gpui_folder_core::Point {
    gpui_folder_core::point(f32::from(position.x), f32::from(position.y))
}

fn to_bounds(bounds: Bounds<Pixels>) -> gpui_folder_core::Bounds {
    gpui_folder_core::Bounds::new(
        f32::from(bounds.origin.x),
        f32::from(bounds.origin.y),
        f32::from(bounds.size.width),
        f32::from(bounds.size.height),
    )
}

/// State of a foldable, reorderable tree of caller-owned records.
///
/// The state never edits `items`, the selection or the fold set on its own. Every change
/// is proposed as a [`FolderEvent`]; the owner applies it and calls the matching setter.
pub struct FolderState<T: 'static> {
    focus_handle: FocusHandle,
    items: Vec<T>,
    accessor: Rc<dyn FolderAccessor<T>>,
    selected: PathSet,
    folded: PathSet,
    entries: FlatTree<T>,
    bounds: Bounds<Pixels>,
    scrollbar_state: ScrollbarState,
    scroll_handle: UniformListScrollHandle,
    session: DragSession<T>,
    press_position: Option<Point<Pixels>>,
    render_item: RenderItemFn<T>,
    _subscriptions: Vec<Subscription>,
}

impl<T: Clone + 'static> FolderState<T> {
    /// A gesture is dropped when the list loses focus (including when it stops being
    /// rendered) or the window is deactivated.
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let focus_handle = cx.focus_handle();
        let subscriptions = vec![
            cx.on_blur(&focus_handle, window, |this, _window, cx| this.cancel_drag(cx)),
            cx.observe_window_activation(window, |this, window, cx| {
                if !window.is_window_active() {
                    this.cancel_drag(cx);
                }
            }),
        ];

        Self {
            focus_handle,
            items: Vec::new(),
            accessor: Rc::new(FolderAccessors::<T>::new()),
            selected: PathSet::new(),
            folded: PathSet::new(),
            entries: FlatTree::from_infos(Vec::new(), DEFAULT_PATH_SEPARATOR),
            bounds: Bounds::default(),
            scrollbar_state: ScrollbarState::default(),
            scroll_handle: UniformListScrollHandle::default(),
            session: DragSession::new(FolderConfig::default()),
            press_position: None,
            render_item: Rc::new(|ix, _, _, _, _| ListItem::new(ix)),
            _subscriptions: subscriptions,
        }
    }

    pub fn accessor(mut self, accessor: impl FolderAccessor<T> + 'static) -> Self {
        self.accessor = Rc::new(accessor);
        self.rebuild_entries();
        self
    }

    pub fn config(mut self, config: FolderConfig<T>) -> Self {
        self.session.set_config(config);
        self.rebuild_entries();
        self
    }

    pub fn items(mut self, items: impl Into<Vec<T>>) -> Self {
        self.items = items.into();
        self.rebuild_entries();
        self
    }

    pub fn selected(mut self, selected: PathSet) -> Self {
        self.selected = selected;
        self
    }

    pub fn folded(mut self, folded: PathSet) -> Self {
        self.folded = folded;
        self.rebuild_entries();
        self
    }

    /// Replace the records. Any gesture in progress is dropped.
    pub fn set_items(&mut self, items: impl Into<Vec<T>>, cx: &mut Context<Self>) {
        self.reset_gesture();
        self.items = items.into();
        self.rebuild_entries();
        cx.notify();
    }

    pub fn set_selected(&mut self, selected: PathSet, cx: &mut Context<Self>) {
        self.selected = selected;
        cx.notify();
    }

    pub fn set_folded(&mut self, folded: PathSet, cx: &mut Context<Self>) {
        self.folded = folded;
        self.rebuild_entries();
        cx.notify();
    }

    pub fn set_config(&mut self, config: FolderConfig<T>, cx: &mut Context<Self>) {
        self.reset_gesture();
        self.session.set_config(config);
        self.rebuild_entries();
        cx.notify();
    }

    pub fn cancel_drag(&mut self, cx: &mut Context<Self>) {
        if self.session.is_active() {
            tracing::debug!(phase = ?self.session.phase(), "cancel drag");
            self.reset_gesture();
            cx.notify();
        }
    }

    pub fn items_ref(&self) -> &[T] {
        &self.items
    }

    pub fn selected_paths(&self) -> &PathSet {
        &self.selected
    }

    pub fn folded_paths(&self) -> &PathSet {
        &self.folded
    }

    /// The rows of the last flatten pass.
    pub fn entries(&self) -> &FlatTree<T> {
        &self.entries
    }

    pub fn options(&self) -> &FolderOptions {
        &self.session.config().options
    }

    pub fn phase(&self) -> DragPhase {
        self.session.phase()
    }

    fn reset_gesture(&mut self) {
        self.session.abort();
        self.press_position = None;
    }

    fn rebuild_entries(&mut self) {
        self.entries = FlatTree::build(
            &self.items,
            self.accessor.as_ref(),
            &self.folded,
            &self.session.config().options.path_separator,
        );
    }

    pub(crate) fn set_bounds(&mut self, bounds: Bounds<Pixels>) {
        self.bounds = bounds;
    }

    fn row_height(&self) -> Pixels {
        self.scroll_handle
            .0
            .borrow()
            .last_item_size
            .map(|s| s.item.height)
            .unwrap_or(px(DEFAULT_ROW_HEIGHT))
    }

    fn rows(&self) -> UniformRows {
        let scroll_y = self.scroll_handle.0.borrow().base_handle.offset().y;
        UniformRows::new(
            gpui_folder_core::point(
                f32::from(self.bounds.origin.x),
                f32::from(self.bounds.origin.y + scroll_y),
            ),
            f32::from(self.bounds.size.width),
            f32::from(self.row_height()),
            self.entries.iter().map(|info| info.path.clone()).collect(),
        )
    }

    fn has_children(&self, info: &FileInfo<T>) -> bool {
        !self.accessor.children_of(&info.value, &info.scope).is_empty()
    }

    fn indent(&self, depth: usize) -> f32 {
        let options = self.options();
        options.gap * depth as f32 + options.gap_offset
    }

    fn is_fold_icon_hit(&self, info: &FileInfo<T>, position: Point<Pixels>) -> bool {
        let options = self.options();
        if !options.show_fold_icon || !self.has_children(info) {
            return false;
        }
        let x = f32::from(position.x - self.bounds.origin.x);
        let start = self.indent(info.depth);
        x >= start && x < start + options.gap
    }

    fn row_state(&self, info: &FileInfo<T>) -> FolderRowState {
        let options = self.options();
        FolderRowState {
            selected: self.selected.contains(&info.path),
            dragging: self.session.is_dragging() && self.session.selected().covers(&info.path),
            folded: self.folded.contains(&info.path),
            has_children: self.has_children(info),
            show_fold_icon: options.show_fold_icon,
            indent: px(self.indent(info.depth)),
            gap: px(options.gap),
        }
    }

    pub(crate) fn on_mouse_down(
        &mut self,
        event: &MouseDownEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !self.bounds.contains(&event.position) {
            return;
        }

        let hit = self
            .rows()
            .index_at(f32::from(event.position.y))
            .and_then(|ix| self.entries.at(ix));
        let on_fold_icon = hit.is_some_and(|info| self.is_fold_icon_hit(info, event.position));
        let down = PointerDown::new(to_point(event.position), hit.map(|info| info.path.clone()))
            .modifiers(ClickModifiers {
                shift: event.modifiers.shift,
            })
            .on_fold_icon(on_fold_icon);

        let tree = FolderTree {
            roots: &self.items,
            accessor: self.accessor.as_ref(),
            selected: &self.selected,
            folded: &self.folded,
        };
        let emitted = self.session.pointer_down(tree, down);
        self.press_position = self.session.is_active().then_some(event.position);

        window.focus(&self.focus_handle);
        window.prevent_default();
        self.emit(emitted, cx);
        cx.notify();
    }

    pub(crate) fn on_mouse_move(&mut self, event: &MouseMoveEvent, cx: &mut Context<Self>) {
        if self.session.phase() == DragPhase::Armed {
            let Some(press) = self.press_position else {
                return;
            };
            let dx = f32::from(event.position.x - press.x).abs();
            let dy = f32::from(event.position.y - press.y).abs();
            if dx.max(dy) < DRAG_THRESHOLD {
                return;
            }
            if let Err(err) = self.session.begin_drag(to_bounds(self.bounds)) {
                tracing::warn!(%err, "could not start drag");
                self.press_position = None;
                cx.notify();
                return;
            }
        }

        if !self.session.is_dragging() {
            return;
        }
        let rows = self.rows();
        self.session.pointer_move(to_point(event.position), &rows);
        cx.notify();
    }

    pub(crate) fn on_mouse_up(&mut self, cx: &mut Context<Self>) {
        if !self.session.is_active() {
            return;
        }
        self.press_position = None;
        let emitted = self.session.release(&self.items, self.accessor.as_ref());
        self.emit(emitted, cx);
        cx.notify();
    }

    pub(crate) fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    fn emit(&mut self, event: Option<FolderEvent<T>>, cx: &mut Context<Self>) {
        if let Some(event) = event {
            cx.emit(event);
        }
    }
}

impl<T: Clone + 'static> EventEmitter<FolderEvent<T>> for FolderState<T> {}

impl<T: Clone + 'static> Render for FolderState<T> {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let render_item = self.render_item.clone();
        let gap_offset = self.options().gap_offset;

        let theme = cx.theme();
        let line = self.session.guideline().map(|guideline| {
            div()
                .absolute()
                .left(px(guideline.x + gap_offset))
                .w(px((guideline.width - gap_offset).max(0.)))
                .top(px(guideline.y - 1.))
                .h(px(2.))
                .bg(theme.drag_border)
        });

        let shadows = self.session.shadow_position().map(|position| {
            let labels = self.session.shadows().into_iter().map(|info| {
                let label: SharedString =
                    self.accessor.name_of(&info.value, info.index, &info.scope).into();
                div()
                    .px(px(10.))
                    .py(px(6.))
                    .rounded(px(8.))
                    .bg(theme.popover)
                    .border_1()
                    .border_color(theme.border)
                    .shadow_md()
                    .text_color(theme.popover_foreground)
                    .text_sm()
                    .child(label)
            });
            v_flex()
                .absolute()
                .left(px(position.x))
                .top(px(position.y))
                .gap_y_1()
                .opacity(0.8)
                .children(labels)
        });

        div()
            .id("folder-state")
            .size_full()
            .relative()
            .child(
                uniform_list("entries", self.entries.len(), {
                    cx.processor(move |state, visible_range: Range<usize>, window, cx| {
                        let mut items = Vec::with_capacity(visible_range.len());
                        for ix in visible_range {
                            let Some(info) = state.entries.at(ix) else {
                                continue;
                            };
                            let row_state = state.row_state(info);
                            let item = (render_item)(ix, info, row_state, window, cx);
                            items.push(div().id(ix).child(item.selected(row_state.selected)));
                        }
                        items
                    })
                })
                .flex_grow()
                .size_full()
                .track_scroll(self.scroll_handle.clone())
                .with_sizing_behavior(ListSizingBehavior::Auto)
                .into_any_element(),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .right_0()
                    .bottom_0()
                    .w(px(12.))
                    .child(Scrollbar::uniform_scroll(
                        &self.scrollbar_state,
                        &self.scroll_handle,
                    )),
            )
            .child(
                div()
                    .absolute()
                    .inset_0()
                    .child(FolderPointerElement::new(cx.entity())),
            )
            .when_some(line, |this, line| this.child(line))
            .when_some(shadows, |this, shadows| this.child(shadows))
    }
}

/// A foldable tree whose rows can be reordered by dragging.
pub struct Folder<T: 'static> {
    id: ElementId,
    state: Entity<FolderState<T>>,
    style: StyleRefinement,
    render_item: RenderItemFn<T>,
}

impl<T: Clone + 'static> Folder<T> {
    pub fn new<R>(state: &Entity<FolderState<T>>, render_item: R) -> Self
    where
        R: Fn(usize, &FileInfo<T>, FolderRowState, &mut Window, &mut App) -> ListItem + 'static,
    {
        Self {
            id: ElementId::Name(format!("folder-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(render_item),
        }
    }
}

impl<T: 'static> Styled for Folder<T> {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl<T: Clone + 'static> IntoElement for Folder<T> {
    type Element = Component<Self>;

    fn into_element(self) -> Self::Element {
        Component::new(self)
    }
}

impl<T: Clone + 'static> RenderOnce for Folder<T> {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}
