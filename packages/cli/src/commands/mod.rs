pub mod batch;
pub mod module;

pub use batch::{sections, snippets, BatchArgs};
pub use module::{module, ModuleArgs};
