//! The style, script and format passes. Each takes a document and returns a
//! new one; none of them edits its input.

use crate::document::{find_elements, Document, Element, RawTag};
use crate::error::{SectionError, SectionResult};
use crate::toolchains::{Notes, Toolchains};
use liquify_bridge::{PipelineAdapter, Restore};
use liquify_common::{Formatter, LanguageMode};
use liquify_compiler_css::compile_style;
use liquify_compiler_html::{compile_component, mount_component};
use liquify_liquid::generate_token;
use liquify_script::inline_imports;
use tracing::{debug, instrument};

/// Compile every `<style type="text/scss">` into a plain `<style>`
#[instrument(skip_all, fields(path = %document.path().display()))]
pub fn styles_pass(document: &Document, toolchains: &Toolchains) -> SectionResult<(Document, Notes)> {
    let mut notes = Notes::default();
    let mut edits = Vec::new();

    for element in document.elements(RawTag::Style)? {
        if !element.has_attribute("type", "text/scss") {
            continue;
        }
        let output = compile_style(
            element.content(document.source()),
            toolchains.style,
            toolchains.salt,
        )?;
        notes.misses.extend(output.misses);

        let css = output.css.trim_end();
        edits.push((
            element.span.clone(),
            format!("{}\n{}\n</style>", element.opening_tag_without("type"), css),
        ));
    }

    debug!(styles = edits.len(), "Compiled styles");
    Ok((document.splice(edits), notes))
}

/// Replace every `<script type="text/babel">` with server-rendered markup
/// and a module script that mounts the component
#[instrument(skip_all, fields(path = %document.path().display()))]
pub fn scripts_pass(document: &Document, toolchains: &Toolchains) -> SectionResult<(Document, Notes)> {
    let mut notes = Notes::default();
    let mut edits = Vec::new();

    for element in document.elements(RawTag::Script)? {
        if !element.has_attribute("type", "text/babel") {
            continue;
        }
        let (markup, script_notes) = compile_script(document, &element, toolchains)?;
        notes = notes.merge(script_notes);
        edits.push((element.span.clone(), markup));
    }

    debug!(scripts = edits.len(), "Compiled scripts");
    Ok((document.splice(edits), notes))
}

fn compile_script(
    document: &Document,
    element: &Element,
    toolchains: &Toolchains,
) -> SectionResult<(String, Notes)> {
    let original = element.content(document.source());
    let id = generate_token(original, toolchains.salt);

    let source = formatted_content(element.outer(document.source()), original, toolchains.formatter)?;

    // Imports are found on tokenized text so Liquid never reaches the
    // module parser
    let tokenized = PipelineAdapter::component(toolchains.salt).tokenize(&source)?;
    let inlined = inline_imports(tokenized.source(), document.path(), toolchains.fs)?;
    let source = tokenized
        .hydrate_with(&inlined.source, Restore::Original)
        .output;

    let component = compile_component(
        &source,
        toolchains.transpiler,
        toolchains.renderer,
        toolchains.salt,
    )?;

    let notes = Notes {
        misses: component.misses,
        import_warnings: inlined.warnings,
    };
    Ok((
        mount_component(&id.to_string(), &component.html, &component.js),
        notes,
    ))
}

/// Script content after formatting the whole element as Liquid. Falls back
/// to the unformatted content when the formatter's output no longer holds
/// a script element.
fn formatted_content(outer: &str, content: &str, formatter: &dyn Formatter) -> SectionResult<String> {
    let formatted = formatter
        .format(outer, LanguageMode::Liquid)
        .map_err(|error| SectionError::toolchain("format", error))?;

    let elements = find_elements(&formatted, RawTag::Script)?;
    Ok(match elements.first() {
        Some(element) => element.content(&formatted).to_string(),
        None => {
            debug!("Formatter dropped the script element");
            content.to_string()
        }
    })
}

/// Format the whole document as Liquid
pub fn format_pass(document: &Document, formatter: &dyn Formatter) -> SectionResult<String> {
    formatter
        .format(document.source(), LanguageMode::Liquid)
        .map_err(|error| SectionError::toolchain("format", error))
}
