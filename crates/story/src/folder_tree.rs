use std::rc::Rc;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::list::ListItem;
use gpui_component::{Icon, IconName, Sizable as _, h_flex, v_flex};
use gpui_folder::{FolderRowState, FolderState, folder};
use gpui_folder_core::{
    FileInfo, FilePath, FolderAccessors, FolderConfig, FolderEvent, MoveEvent, PathSet,
};

/// Cheap to clone: the folder keeps one copy per visible row.
#[derive(Clone, Debug)]
pub struct Info {
    id: SharedString,
    name: SharedString,
    is_dir: bool,
    children: Rc<Vec<Info>>,
}

impl Info {
    fn file(name: &'static str) -> Self {
        Self {
            id: name.into(),
            name: name.into(),
            is_dir: false,
            children: Rc::default(),
        }
    }

    fn dir(name: &'static str, children: Vec<Info>) -> Self {
        Self {
            id: name.into(),
            name: name.into(),
            is_dir: true,
            children: Rc::new(children),
        }
    }
}

pub struct FolderTreeExample {
    tree: Entity<FolderState<Info>>,
    roots: Vec<Info>,
    last_event: SharedString,
    _subscriptions: Vec<Subscription>,
}

impl FolderTreeExample {
    pub fn view(window: &mut Window, cx: &mut App) -> Entity<Self> {
        let roots = demo_items();
        let tree = cx.new(|cx| {
            FolderState::<Info>::new(window, cx)
                .accessor(
                    FolderAccessors::new()
                        .id(|info: &Info, _, _| info.id.to_string())
                        .name(|info, _, _| info.name.to_string())
                        .children(|info, _| info.children.as_slice()),
                )
                .config(
                    FolderConfig::<Info>::default()
                        .gap(16.)
                        .gap_offset(10.)
                        .multiselect(true)
                        // Only directories accept children.
                        .on_check_move(|candidate| {
                            candidate
                                .parent
                                .as_ref()
                                .is_none_or(|parent| parent.value.is_dir)
                        }),
                )
                .items(roots.clone())
        });

        cx.new(|cx| {
            let subscriptions = vec![cx.subscribe(&tree, Self::on_folder_event)];
            Self {
                tree,
                roots,
                last_event: "<none>".into(),
                _subscriptions: subscriptions,
            }
        })
    }

    fn on_folder_event(
        &mut self,
        tree: Entity<FolderState<Info>>,
        event: &FolderEvent<Info>,
        cx: &mut Context<Self>,
    ) {
        match event {
            FolderEvent::Select(event) => {
                self.last_event =
                    format!("select {} ({} selected)", event.path, event.selected.len()).into();
                let selected = event.selected.clone();
                tree.update(cx, |tree, cx| tree.set_selected(selected, cx));
            }
            FolderEvent::Fold(event) => {
                let verb = if event.is_folded { "fold" } else { "unfold" };
                self.last_event = format!("{verb} {}", event.path).into();
                let folded = event.folded.clone();
                tree.update(cx, |tree, cx| tree.set_folded(folded, cx));
            }
            FolderEvent::Move(event) => {
                self.last_event = format!(
                    "move {} row(s) into `{}`",
                    event.selected_infos.len(),
                    event.parent_path()
                )
                .into();
                apply_move(&mut self.roots, event);

                let parent = event.parent_path();
                let selected: PathSet = event
                    .selected_infos
                    .iter()
                    .map(|info| parent.child(info.id.clone()))
                    .collect();
                let roots = self.roots.clone();
                let folded = event.folded.clone();
                tree.update(cx, |tree, cx| {
                    tree.set_items(roots, cx);
                    tree.set_folded(folded, cx);
                    tree.set_selected(selected, cx);
                });
            }
        }
        cx.notify();
    }
}

impl Render for FolderTreeExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let tree_dump = format_tree(&self.roots);

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(div().text_xl().font_weight(FontWeight::BOLD).child("Folder"))
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Tip: drag rows to reorder. The line shows where the rows will land; move the pointer left or right to pick the depth. Shift-click selects several rows. Click a chevron to fold. Files never accept children."),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(format!("Last event: {}", self.last_event)),
                    ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        v_flex()
                            .w(px(420.))
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Tree"))
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .child(folder(&self.tree, move |ix, info, row_state, _window, cx| {
                                        render_tree_row(ix, info, row_state, cx)
                                    })),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Debug (tree structure)"),
                            )
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .p(px(12.))
                                    .child(render_tree_dump(tree_dump)),
                            ),
                    ),
            )
    }
}

fn render_tree_row(
    ix: usize,
    info: &FileInfo<Info>,
    row_state: FolderRowState,
    cx: &mut App,
) -> ListItem {
    let theme = cx.theme();
    let icon = match (info.value.is_dir, row_state.folded) {
        (true, true) => IconName::Folder,
        (true, false) => IconName::FolderOpen,
        (false, _) => IconName::File,
    };
    let chevron = if row_state.folded {
        IconName::ChevronRight
    } else {
        IconName::ChevronDown
    };
    let icon_color = if row_state.selected {
        theme.foreground
    } else {
        theme.muted_foreground
    };

    ListItem::new(ix)
        .pl(row_state.indent)
        .when(row_state.dragging, |this| this.opacity(0.4))
        .child(
            h_flex()
                .items_center()
                .child(
                    div()
                        .w(row_state.gap)
                        .flex_shrink_0()
                        .when(row_state.show_fold_icon && row_state.has_children, |this| {
                            this.child(Icon::new(chevron).small().text_color(theme.muted_foreground))
                        }),
                )
                .child(
                    h_flex()
                        .gap_x_2()
                        .items_center()
                        .child(Icon::new(icon).small().text_color(icon_color))
                        .child(info.value.name.clone()),
                ),
        )
}

fn render_tree_dump(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn children_mut<'a>(roots: &'a mut Vec<Info>, parent: &FilePath) -> Option<&'a mut Vec<Info>> {
    let mut list = roots;
    for segment in parent.segments() {
        let node = list
            .iter_mut()
            .find(|info| info.id.as_ref() == segment.as_str())?;
        list = Rc::make_mut(&mut node.children);
    }
    Some(list)
}

/// Replace the target child list, then detach the moved rows from their old parents.
fn apply_move(roots: &mut Vec<Info>, event: &MoveEvent<Info>) {
    let parent = event.parent_path();
    let Some(children) = children_mut(roots, &parent) else {
        tracing::warn!(%parent, "move target is gone");
        return;
    };
    *children = event.children.clone();

    for info in &event.selected_infos {
        if info.parent_path == parent {
            continue;
        }
        if let Some(children) = children_mut(roots, &info.parent_path) {
            children.retain(|node| node.id.as_ref() != info.id);
        }
    }
}

fn format_tree(items: &[Info]) -> String {
    fn walk(items: &[Info], depth: usize, out: &mut String) {
        for item in items {
            out.push_str(&"  ".repeat(depth));
            out.push_str(item.id.as_ref());
            out.push('\n');
            walk(&item.children, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(items, 0, &mut out);
    out
}

fn demo_items() -> Vec<Info> {
    vec![
        Info::dir(
            "src",
            vec![
                Info::dir(
                    "ui",
                    vec![
                        Info::file("button.rs"),
                        Info::file("icon.rs"),
                        Info::file("folder.rs"),
                    ],
                ),
                Info::file("main.rs"),
                Info::file("lib.rs"),
            ],
        ),
        Info::dir("tests", vec![Info::file("gesture.rs")]),
        Info::file("Cargo.toml"),
        Info::file("README.md"),
    ]
}
