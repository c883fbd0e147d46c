//! Component modules: a section written as one script whose default export
//! is the component, with `style` and `schema` exports beside it

use crate::document::Document;
use crate::error::{SectionError, SectionResult};
use crate::passes::format_pass;
use crate::schema::{parse_schema, schema_block};
use crate::toolchains::{Compiled, Notes, Toolchains};
use liquify_bridge::{PipelineAdapter, Restore, Tokenized};
use liquify_compiler_css::compile_style;
use liquify_compiler_html::{compile_component, mount_component, ROOT_COMPONENT};
use liquify_liquid::generate_token;
use liquify_script::ast::{DefaultTarget, ExprKind};
use liquify_script::{
    inline_imports, parse_module, resolve_in_module, ExportName, Item, Module, Resolution,
    Unresolved,
};
use std::ops::Range;
use tracing::{debug, info, instrument};

/// Named exports that configure the section instead of the component
const SECTION_EXPORTS: &[&str] = &["style", "schema"];

/// Compile a component module into section markup: the compiled `style`
/// export, the mounted default export and the `schema` export.
///
/// The module is tokenized once; exports are resolved on the tokenized text
/// and hydrated before each is compiled on its own.
#[instrument(skip_all, fields(path = %document.path().display()))]
pub fn compile_module(document: &Document, toolchains: &Toolchains) -> SectionResult<Compiled> {
    let tokenized = PipelineAdapter::component(toolchains.salt).tokenize(document.source())?;
    let module = parse_module(tokenized.source())?;

    if let Resolution::Unresolved(reason) =
        resolve_in_module(&module, tokenized.source(), &ExportName::Default)
    {
        return Err(SectionError::UnresolvedExport {
            export: ExportName::Default.to_string(),
            reason,
        });
    }
    let style = section_export(&module, &tokenized, "style")?;
    let schema = section_export(&module, &tokenized, "schema")?;

    let mut notes = Notes::default();
    let mut parts = Vec::new();

    if let Some(style) = style {
        let output = compile_style(&style, toolchains.style, toolchains.salt)?;
        notes.misses.extend(output.misses);
        parts.push(format!("<style>\n{}\n</style>", output.css.trim_end()));
    }

    let component = component_source(&module, tokenized.source());
    let inlined = inline_imports(&component, document.path(), toolchains.fs)?;
    notes.import_warnings.extend(inlined.warnings);
    let component = tokenized
        .hydrate_with(&inlined.source, Restore::Original)
        .output;
    let compiled = compile_component(
        &component,
        toolchains.transpiler,
        toolchains.renderer,
        toolchains.salt,
    )?;
    notes.misses.extend(compiled.misses);

    let id = generate_token(document.source(), toolchains.salt);
    parts.push(mount_component(&id.to_string(), &compiled.html, &compiled.js));

    if let Some(schema) = schema {
        parts.push(schema_block(&parse_schema(schema.trim())?)?);
    }

    let output = format_pass(&document.with_source(parts.join("\n")), toolchains.formatter)?;
    info!(misses = notes.misses.len(), "Compiled module");
    Ok(Compiled { output, notes })
}

/// Hydrated value of a named export, `None` when the module has no such
/// export
fn section_export(
    module: &Module,
    tokenized: &Tokenized,
    name: &str,
) -> SectionResult<Option<String>> {
    match resolve_in_module(module, tokenized.source(), &ExportName::named(name)) {
        Resolution::Resolved(resolved) => {
            // The value holds only some of the module's fragments, so
            // misses here mean nothing
            let hydrated = tokenized.hydrate_with(&resolved.value, Restore::Original);
            Ok(Some(hydrated.output))
        }
        Resolution::Unresolved(Unresolved::NotExported(_)) => {
            debug!(name, "Module has no such export");
            Ok(None)
        }
        Resolution::Unresolved(reason) => Err(SectionError::UnresolvedExport {
            export: name.to_string(),
            reason,
        }),
    }
}

/// The module as a script defining `App`: the default export becomes an
/// `App` binding, section exports and export lists are removed, everything
/// else is kept in place
fn component_source(module: &Module, source: &str) -> String {
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    let mut app = None;

    for (index, item) in module.items.iter().enumerate() {
        match item {
            Item::ExportDefault(export) => match &export.target {
                DefaultTarget::Declaration(name) => {
                    // The declaration item directly precedes its export
                    let declaration_start = match index.checked_sub(1).map(|i| &module.items[i]) {
                        Some(Item::Function(function)) => function.span.start,
                        Some(Item::Class(class)) => class.span.start,
                        _ => export.span.start,
                    };
                    edits.push((export.span.start..declaration_start, String::new()));
                    app = Some(name.clone());
                }
                DefaultTarget::Expression(expr) => {
                    let replacement = match &expr.kind {
                        ExprKind::Identifier(name) => {
                            app = Some(name.clone());
                            String::new()
                        }
                        _ => format!("const {} = {};", ROOT_COMPONENT, expr.span.text(source)),
                    };
                    edits.push((export.span.start..export.span.end, replacement));
                }
            },
            Item::ExportList(list) => {
                if let Some(specifier) = list.specifiers.iter().find(|s| s.exported == "default") {
                    app = Some(specifier.local.clone());
                }
                edits.push((list.span.start..list.span.end, String::new()));
            }
            Item::Variable(variable)
                if variable.exported
                    && variable.declarators.iter().all(|declarator| {
                        declarator
                            .name
                            .as_deref()
                            .is_some_and(|name| SECTION_EXPORTS.contains(&name))
                    }) =>
            {
                let start = export_keyword_start(source, variable.span.start);
                edits.push((start..variable.span.end, String::new()));
            }
            _ => {}
        }
    }

    let mut component = Document::new("", source).splice(edits).into_source();
    if let Some(name) = app.filter(|name| name != ROOT_COMPONENT) {
        component.push_str(&format!("\nconst {} = {};\n", ROOT_COMPONENT, name));
    }
    component
}

/// Start of the `export` keyword in front of a declaration at `start`
fn export_keyword_start(source: &str, start: usize) -> usize {
    let before = source[..start].trim_end();
    match before.strip_suffix("export") {
        Some(rest) => rest.len(),
        None => start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(source: &str) -> String {
        component_source(&parse_module(source).unwrap(), source)
    }

    #[test]
    fn test_default_function_becomes_app() {
        assert_eq!(
            component("export default function Hero() { return null; }"),
            "function Hero() { return null; }\nconst App = Hero;\n"
        );
        assert_eq!(
            component("export default function App() {}"),
            "function App() {}"
        );
    }

    #[test]
    fn test_default_expression_becomes_app() {
        assert_eq!(
            component("export default () => <p/>;"),
            "const App = () => <p/>;"
        );
        assert_eq!(
            component("const Hero = () => null;\nexport default Hero;"),
            "const Hero = () => null;\n\nconst App = Hero;\n"
        );
    }

    #[test]
    fn test_section_exports_are_removed() {
        let source = "import React from 'react';\nexport const style = `.a { b: c; }`;\nexport const schema = { name: 'A' };\nexport const label = 'x';\nfunction Hero() {}\nexport { Hero as default };";
        assert_eq!(
            component(source),
            "import React from 'react';\n\n\nexport const label = 'x';\nfunction Hero() {}\n\nconst App = Hero;\n"
        );
    }
}
