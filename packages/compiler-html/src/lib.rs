pub mod compiler;
pub mod markup;

pub use compiler::{compile_component, ComponentOutput};
pub use markup::{mount_component, strip_preload_links, ROOT_COMPONENT};
