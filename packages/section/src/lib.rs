pub mod compile;
pub mod document;
pub mod error;
pub mod module;
pub mod passes;
pub mod schema;
pub mod toolchains;

pub use compile::{compile_section, compile_snippet};
pub use document::{find_elements, Attribute, Document, Element, RawTag};
pub use error::{SectionError, SectionResult};
pub use module::compile_module;
pub use passes::{format_pass, scripts_pass, styles_pass};
pub use schema::{parse_schema, schema_block, schema_pass};
pub use toolchains::{Compiled, Notes, Toolchains};
