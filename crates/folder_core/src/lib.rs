mod accessor;
mod commit;
mod config;
mod error;
mod flatten;
mod geometry;
mod path;
mod resolve;
mod select;
mod session;
mod store;

pub use crate::accessor::*;
pub use crate::commit::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::flatten::*;
pub use crate::geometry::*;
pub use crate::path::*;
pub use crate::resolve::*;
pub use crate::select::*;
pub use crate::session::*;
pub use crate::store::*;
