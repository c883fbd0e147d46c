use liquify_bridge::HydrationMiss;
use liquify_common::{ComponentRenderer, FileSystem, Formatter, StyleCompiler, Transpiler};
use liquify_script::ImportWarning;

/// The external collaborators a compilation hands text to, plus the token
/// salt. Every pass takes these explicitly.
#[derive(Clone, Copy)]
pub struct Toolchains<'a> {
    pub formatter: &'a dyn Formatter,
    pub transpiler: &'a dyn Transpiler,
    pub style: &'a dyn StyleCompiler,
    pub renderer: &'a dyn ComponentRenderer,
    /// Source of imported component files
    pub fs: &'a dyn FileSystem,
    pub salt: &'a str,
}

/// Recoverable findings collected while compiling one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notes {
    pub misses: Vec<HydrationMiss>,
    pub import_warnings: Vec<ImportWarning>,
}

impl Notes {
    pub fn is_empty(&self) -> bool {
        self.misses.is_empty() && self.import_warnings.is_empty()
    }

    pub fn merge(mut self, other: Notes) -> Self {
        self.misses.extend(other.misses);
        self.import_warnings.extend(other.import_warnings);
        self
    }
}

/// Output of compiling a document
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub output: String,
    pub notes: Notes,
}
