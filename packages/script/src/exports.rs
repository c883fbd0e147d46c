//! Resolve an exported name to the source text of its definition.

use crate::ast::*;
use crate::error::ScriptResult;
use crate::parser::parse_module;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Alias steps followed before giving up
pub const MAX_ALIAS_HOPS: usize = 10;

/// Which export to resolve
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExportName {
    Default,
    Named(String),
}

impl ExportName {
    pub fn named(name: impl Into<String>) -> Self {
        ExportName::Named(name.into())
    }
}

impl std::fmt::Display for ExportName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportName::Default => write!(f, "default"),
            ExportName::Named(name) => write!(f, "{}", name),
        }
    }
}

/// What a top-level binding is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    Function,
    /// Another binding, by name
    Reference(String),
    /// Unescaped value
    StringLiteral(String),
    /// Raw text between the backticks
    TemplateLiteral(String),
    OpaqueSpan,
}

/// A top-level binding and the span of its definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    /// The function or class declaration, or the initializer expression
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Resolved),
    Unresolved(Unresolved),
}

impl Resolution {
    /// The resolved value, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(resolved) => Some(&resolved.value),
            Resolution::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The string's unescaped value, the template's raw text, or the exact
    /// source text of anything else
    pub value: String,
    /// Exact source text of the definition, quotes and backticks included
    pub source_text: String,
    /// Name of the function declaration the chain ended at
    pub function: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unresolved {
    #[error("no export named {0}")]
    NotExported(ExportName),
    #[error("{0} is not declared at the top level")]
    MissingDeclaration(String),
    #[error("alias chain from {start} is longer than {} steps", MAX_ALIAS_HOPS)]
    HopBudgetExceeded { start: String },
}

/// Index every top-level function, class and variable declarator by name,
/// exported or not
pub fn collect_declarations(module: &Module) -> HashMap<String, Declaration> {
    let mut declarations = HashMap::new();

    for item in &module.items {
        match item {
            Item::Function(FunctionDecl {
                name: Some(name),
                span,
                ..
            }) => {
                declarations.insert(
                    name.clone(),
                    Declaration {
                        name: name.clone(),
                        kind: DeclarationKind::Function,
                        span: *span,
                    },
                );
            }
            Item::Class(ClassDecl {
                name: Some(name),
                span,
                ..
            }) => {
                declarations.insert(
                    name.clone(),
                    Declaration {
                        name: name.clone(),
                        kind: DeclarationKind::OpaqueSpan,
                        span: *span,
                    },
                );
            }
            Item::Variable(variable) => {
                for declarator in &variable.declarators {
                    let (Some(name), Some(init)) = (&declarator.name, &declarator.init) else {
                        continue;
                    };
                    declarations.insert(
                        name.clone(),
                        Declaration {
                            name: name.clone(),
                            kind: expression_kind(init),
                            span: init.span,
                        },
                    );
                }
            }
            _ => {}
        }
    }

    declarations
}

fn expression_kind(expr: &Expr) -> DeclarationKind {
    match &expr.kind {
        ExprKind::Identifier(name) => DeclarationKind::Reference(name.clone()),
        ExprKind::String(value) => DeclarationKind::StringLiteral(value.clone()),
        ExprKind::Template(raw) => DeclarationKind::TemplateLiteral(raw.clone()),
        ExprKind::Other => DeclarationKind::OpaqueSpan,
    }
}

/// Where an export points: a top-level binding, or an expression written
/// directly after `export default`
enum ExportTarget<'m> {
    Binding(&'m str),
    Expression(&'m Expr),
}

fn find_export<'m>(module: &'m Module, export: &ExportName) -> Option<ExportTarget<'m>> {
    module.items.iter().find_map(|item| match (item, export) {
        (Item::ExportDefault(default), ExportName::Default) => Some(match &default.target {
            DefaultTarget::Declaration(name) => ExportTarget::Binding(name),
            DefaultTarget::Expression(expr) => ExportTarget::Expression(expr),
        }),
        (Item::ExportList(list), export) if list.from.is_none() => list
            .specifiers
            .iter()
            .find(|specifier| match export {
                ExportName::Default => specifier.exported == "default",
                ExportName::Named(name) => &specifier.exported == name,
            })
            .map(|specifier| ExportTarget::Binding(&specifier.local)),
        (Item::Function(function), ExportName::Named(name)) if function.exported => function
            .name
            .as_deref()
            .filter(|declared| *declared == name.as_str())
            .map(ExportTarget::Binding),
        (Item::Class(class), ExportName::Named(name)) if class.exported => class
            .name
            .as_deref()
            .filter(|declared| *declared == name.as_str())
            .map(ExportTarget::Binding),
        (Item::Variable(variable), ExportName::Named(name)) if variable.exported => variable
            .declarators
            .iter()
            .filter_map(|declarator| declarator.name.as_deref())
            .find(|declared| *declared == name.as_str())
            .map(ExportTarget::Binding),
        _ => None,
    })
}

/// Parse `source` and resolve `export` to the text of its definition.
///
/// Alias chains (`const b = a`) are followed for at most
/// [`MAX_ALIAS_HOPS`] steps. Only a syntax error in `source` is an error;
/// a missing export or binding is an [`Unresolved`] value.
#[instrument(skip(source, export), fields(export = %export, len = source.len()))]
pub fn resolve_export(source: &str, export: &ExportName) -> ScriptResult<Resolution> {
    let module = parse_module(source)?;
    Ok(resolve_in_module(&module, source, export))
}

/// Resolve `export` in an already parsed module
pub fn resolve_in_module(module: &Module, source: &str, export: &ExportName) -> Resolution {
    let Some(target) = find_export(module, export) else {
        debug!("Export not found");
        return Resolution::Unresolved(Unresolved::NotExported(export.clone()));
    };

    let declarations = collect_declarations(module);
    let start = match target {
        ExportTarget::Expression(expr) => match &expr.kind {
            ExprKind::Identifier(name) => name.as_str(),
            _ => return Resolution::Resolved(resolved(source, &expression_kind(expr), expr.span, None)),
        },
        ExportTarget::Binding(name) => name,
    };

    let mut name = start;
    let mut hops = 0;
    loop {
        let Some(declaration) = declarations.get(name) else {
            debug!(name, "Binding has no top-level declaration");
            return Resolution::Unresolved(Unresolved::MissingDeclaration(name.to_string()));
        };

        match &declaration.kind {
            DeclarationKind::Reference(target) => {
                if hops == MAX_ALIAS_HOPS {
                    debug!(start, hops, "Alias chain exceeds hop budget");
                    return Resolution::Unresolved(Unresolved::HopBudgetExceeded {
                        start: start.to_string(),
                    });
                }
                hops += 1;
                name = target;
            }
            DeclarationKind::Function => {
                return Resolution::Resolved(resolved(
                    source,
                    &declaration.kind,
                    declaration.span,
                    Some(&declaration.name),
                ));
            }
            kind => return Resolution::Resolved(resolved(source, kind, declaration.span, None)),
        }
    }
}

fn resolved(source: &str, kind: &DeclarationKind, span: Span, function: Option<&str>) -> Resolved {
    let source_text = span.text(source).to_string();
    let value = match kind {
        DeclarationKind::StringLiteral(value) | DeclarationKind::TemplateLiteral(value) => {
            value.clone()
        }
        DeclarationKind::Function | DeclarationKind::Reference(_) | DeclarationKind::OpaqueSpan => {
            source_text.clone()
        }
    };

    Resolved {
        value,
        source_text,
        function: function.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(source: &str, export: ExportName) -> Resolution {
        resolve_export(source, &export).unwrap()
    }

    fn alias_chain(aliases: usize) -> String {
        let mut source = String::from("const a0 = \"end\";\n");
        for i in 1..=aliases {
            source.push_str(&format!("const a{} = a{};\n", i, i - 1));
        }
        source.push_str(&format!("export default a{};\n", aliases));
        source
    }

    #[test]
    fn test_alias_chain_resolves_unquoted() {
        let source = r#"const a = "hello"; const b = a; export default b;"#;
        assert_eq!(resolve(source, ExportName::Default).value(), Some("hello"));
    }

    #[test]
    fn test_hop_budget() {
        assert_eq!(
            resolve(&alias_chain(MAX_ALIAS_HOPS), ExportName::Default).value(),
            Some("end")
        );
        assert_eq!(
            resolve(&alias_chain(MAX_ALIAS_HOPS + 1), ExportName::Default),
            Resolution::Unresolved(Unresolved::HopBudgetExceeded {
                start: "a11".to_string()
            })
        );
    }

    #[test]
    fn test_self_reference_terminates() {
        let source = "var loop = loop; export default loop;";
        assert!(matches!(
            resolve(source, ExportName::Default),
            Resolution::Unresolved(Unresolved::HopBudgetExceeded { .. })
        ));
    }

    #[test]
    fn test_template_literal_returns_raw_body() {
        let source = "export const style = `\n  .a { color: ${c}; }\n`;";
        assert_eq!(
            resolve(source, ExportName::named("style")).value(),
            Some("\n  .a { color: ${c}; }\n")
        );
    }

    #[test]
    fn test_object_returns_source_text() {
        let source = "const schema = {\n  name: \"Hero\",\n  settings: []\n}\nexport { schema };";
        assert_eq!(
            resolve(source, ExportName::named("schema")).value(),
            Some("{\n  name: \"Hero\",\n  settings: []\n}")
        );
    }

    #[test]
    fn test_default_function_declaration() {
        let source = "export default function App() {\n  return <div />;\n}";
        let Resolution::Resolved(resolved) = resolve(source, ExportName::Default) else {
            panic!("expected a resolution");
        };
        assert_eq!(resolved.function.as_deref(), Some("App"));
        assert_eq!(resolved.value, source.trim_start_matches("export default "));
    }

    #[test]
    fn test_export_list_as_default() {
        let source = "const Title = 'T';\nexport { Title as default };";
        assert_eq!(resolve(source, ExportName::Default).value(), Some("T"));
    }

    #[test]
    fn test_default_expression_written_inline() {
        let source = "export default \"inline\";";
        let Resolution::Resolved(resolved) = resolve(source, ExportName::Default) else {
            panic!("expected a resolution");
        };
        assert_eq!(resolved.value, "inline");
        assert_eq!(resolved.source_text, "\"inline\"");
    }

    #[test]
    fn test_unresolved_cases() {
        assert_eq!(
            resolve("export const a = 1;", ExportName::named("b")),
            Resolution::Unresolved(Unresolved::NotExported(ExportName::named("b")))
        );
        assert_eq!(
            resolve("export default missing;", ExportName::Default),
            Resolution::Unresolved(Unresolved::MissingDeclaration("missing".to_string()))
        );
        assert_eq!(
            resolve("export { x } from './x';", ExportName::named("x")),
            Resolution::Unresolved(Unresolved::NotExported(ExportName::named("x")))
        );
    }

    #[test]
    fn test_unexported_declarations_are_collected() {
        let module = parse_module("function f() {}\nconst g = f;\nlet h;").unwrap();
        let declarations = collect_declarations(&module);
        assert_eq!(declarations["f"].kind, DeclarationKind::Function);
        assert_eq!(
            declarations["g"].kind,
            DeclarationKind::Reference("f".to_string())
        );
        assert!(!declarations.contains_key("h"));
    }
}
