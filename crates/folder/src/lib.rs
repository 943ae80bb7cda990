mod element;
mod folder;

pub use folder::{Folder, FolderRowState, FolderState, folder};
