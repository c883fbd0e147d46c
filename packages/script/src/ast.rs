//! Top-level structure of a component module.
//!
//! Only what import inlining and export resolution need is modeled:
//! statement boundaries, declarations and module syntax. Everything else is
//! kept as source spans.

use serde::Serialize;

/// Byte range in the module source, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start..self.end]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Module {
    pub items: Vec<Item>,
}

impl Module {
    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Import(import) => Some(import),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Item {
    Import(ImportDecl),
    Function(FunctionDecl),
    Class(ClassDecl),
    Variable(VariableDecl),
    ExportDefault(ExportDefault),
    ExportList(ExportList),
    /// Any other statement, kept as text
    Statement { span: Span },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportDecl {
    /// The whole statement including a trailing `;`
    pub span: Span,
    pub specifier: String,
    pub bindings: Vec<ImportBinding>,
}

impl ImportDecl {
    /// `./x` and `../x` specifiers; package imports are not relative
    pub fn is_relative(&self) -> bool {
        self.specifier.starts_with("./") || self.specifier.starts_with("../")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ImportBinding {
    /// `import local from "..."`
    Default { local: String },
    /// `import { imported as local } from "..."`
    Named { imported: String, local: String },
    /// `import * as local from "..."`
    Namespace { local: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Option<String>,
    /// From `async`/`function` through the closing brace
    pub span: Span,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    pub name: Option<String>,
    pub span: Span,
    pub exported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDecl {
    pub kind: VariableKind,
    pub declarators: Vec<Declarator>,
    pub exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declarator {
    /// `None` for destructuring patterns
    pub name: Option<String>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum ExprKind {
    /// A lone identifier
    Identifier(String),
    /// A lone string literal, unescaped
    String(String),
    /// A lone template literal, raw text between the backticks
    Template(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDefault {
    pub span: Span,
    pub target: DefaultTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum DefaultTarget {
    /// `export default function name() {}` or `export default class name {}`
    Declaration(String),
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportList {
    pub span: Span,
    pub specifiers: Vec<ExportSpecifier>,
    /// Re-export source of `export { .. } from "..."`
    pub from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}
