use std::rc::Rc;

use crate::path::FilePath;

/// Reads structure out of caller-owned records.
///
/// `scope` is always the id sequence of the node's ancestors (excluding the node itself).
/// Implementations must be deterministic for a given node and position: a drag gesture
/// performs many lookups against one snapshot and expects them to agree.
pub trait FolderAccessor<T> {
    fn id_of(&self, node: &T, index: usize, scope: &[String]) -> String;

    fn name_of(&self, node: &T, index: usize, scope: &[String]) -> String;

    fn children_of<'a>(&self, node: &'a T, scope: &[String]) -> &'a [T];

    /// Derive the structural path of a node. Defaults to `scope + [id]`.
    ///
    /// Custom implementations must keep the result `scope.len() + 1` segments long and
    /// prefixed by the parent's path, otherwise depth and ancestry checks disagree.
    fn path_of(&self, id: &str, scope: &[String], _node: &T, _index: usize) -> FilePath {
        scope.iter().map(String::as_str).chain([id]).collect()
    }
}

type LabelFn<T> = Rc<dyn Fn(&T, usize, &[String]) -> String>;
type ChildrenFn<T> = Rc<dyn for<'a> Fn(&'a T, &[String]) -> &'a [T]>;
type PathFn<T> = Rc<dyn Fn(&str, &[String], &T, usize) -> FilePath>;

/// A [`FolderAccessor`] assembled from closures.
///
/// Unset accessors fall back to: id and name = sibling index, no children,
/// path = `scope + [id]`.
pub struct FolderAccessors<T> {
    id: LabelFn<T>,
    name: LabelFn<T>,
    children: ChildrenFn<T>,
    path: Option<PathFn<T>>,
}

fn index_label<T>(_: &T, index: usize, _: &[String]) -> String {
    index.to_string()
}

fn no_children<'a, T>(_: &'a T, _: &[String]) -> &'a [T] {
    &[]
}

impl<T: 'static> FolderAccessors<T> {
    pub fn new() -> Self {
        Self {
            id: Rc::new(index_label::<T>),
            name: Rc::new(index_label::<T>),
            children: Rc::new(no_children::<T>),
            path: None,
        }
    }

    pub fn id(mut self, f: impl Fn(&T, usize, &[String]) -> String + 'static) -> Self {
        self.id = Rc::new(f);
        self
    }

    pub fn name(mut self, f: impl Fn(&T, usize, &[String]) -> String + 'static) -> Self {
        self.name = Rc::new(f);
        self
    }

    pub fn children<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a T, &[String]) -> &'a [T] + 'static,
    {
        self.children = Rc::new(f);
        self
    }

    pub fn path(mut self, f: impl Fn(&str, &[String], &T, usize) -> FilePath + 'static) -> Self {
        self.path = Some(Rc::new(f));
        self
    }
}

impl<T: 'static> Default for FolderAccessors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FolderAccessors<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            children: self.children.clone(),
            path: self.path.clone(),
        }
    }
}

impl<T> FolderAccessor<T> for FolderAccessors<T> {
    fn id_of(&self, node: &T, index: usize, scope: &[String]) -> String {
        (self.id)(node, index, scope)
    }

    fn name_of(&self, node: &T, index: usize, scope: &[String]) -> String {
        (self.name)(node, index, scope)
    }

    fn children_of<'a>(&self, node: &'a T, scope: &[String]) -> &'a [T] {
        (self.children)(node, scope)
    }

    fn path_of(&self, id: &str, scope: &[String], node: &T, index: usize) -> FilePath {
        match &self.path {
            Some(path) => path(id, scope, node, index),
            None => scope.iter().map(String::as_str).chain([id]).collect(),
        }
    }
}
