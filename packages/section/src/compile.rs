use crate::document::Document;
use crate::error::SectionResult;
use crate::passes::{format_pass, scripts_pass, styles_pass};
use crate::schema::schema_pass;
use crate::toolchains::{Compiled, Toolchains};
use tracing::{info, instrument};

/// Compile a section: schema, then styles, then scripts, then formatting
#[instrument(skip_all, fields(path = %document.path().display()))]
pub fn compile_section(document: &Document, toolchains: &Toolchains) -> SectionResult<Compiled> {
    let document = schema_pass(document)?;
    let (document, style_notes) = styles_pass(&document, toolchains)?;
    let (document, script_notes) = scripts_pass(&document, toolchains)?;
    let output = format_pass(&document, toolchains.formatter)?;

    let notes = style_notes.merge(script_notes);
    info!(misses = notes.misses.len(), "Compiled section");
    Ok(Compiled { output, notes })
}

/// Compile a snippet. Snippets carry no schema.
#[instrument(skip_all, fields(path = %document.path().display()))]
pub fn compile_snippet(document: &Document, toolchains: &Toolchains) -> SectionResult<Compiled> {
    let (document, style_notes) = styles_pass(document, toolchains)?;
    let (document, script_notes) = scripts_pass(&document, toolchains)?;
    let output = format_pass(&document, toolchains.formatter)?;

    let notes = style_notes.merge(script_notes);
    info!(misses = notes.misses.len(), "Compiled snippet");
    Ok(Compiled { output, notes })
}
