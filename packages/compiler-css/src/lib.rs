pub mod compiler;
pub mod error;
pub mod pipeline;

pub use compiler::{compile_scss, SassCompiler};
pub use error::{StyleError, StyleResult};
pub use pipeline::{compile_style, StyleOutput};
