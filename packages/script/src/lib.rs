pub mod ast;
pub mod error;
pub mod exports;
pub mod imports;
pub mod lexer;
pub mod parser;
pub mod scan;

pub use ast::{ImportBinding, ImportDecl, Item, Module, Span};
#[cfg(feature = "pretty-errors")]
pub use error::format_errors;
pub use error::{ScriptError, ScriptResult};
pub use exports::{
    collect_declarations, resolve_export, resolve_in_module, Declaration, DeclarationKind,
    ExportName, Resolution, Resolved, Unresolved, MAX_ALIAS_HOPS,
};
pub use imports::{inline_imports, resolve_import_path, ImportWarning, ImportWarningKind, Inlined};
pub use parser::{parse_module, Parser};
