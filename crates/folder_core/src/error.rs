use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FolderError {
    /// A path referenced by a gesture is not part of the current snapshot.
    #[error("path `{0}` is not part of the flattened tree")]
    MissingPath(String),
    /// The drop point lies on or under one of the nodes being moved.
    #[error("cannot move a node into itself at `{0}`")]
    IntoSelection(String),
    #[error("no rows are selected")]
    EmptySelection,
    #[error("no drag is in progress")]
    NotDragging,
}
