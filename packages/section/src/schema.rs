//! Section schemas: JSON, or a JavaScript object literal restricted to
//! data, turned into a `{% schema %}` block

use crate::document::{Document, RawTag};
use crate::error::{SectionError, SectionResult};
use serde_json::Value;
use tracing::{debug, instrument};

/// Parse schema text as a data literal.
///
/// Plain JSON is accepted as is. Otherwise the text may use the object
/// literal conveniences authors write in component modules: unquoted keys,
/// single-quoted strings, trailing commas and comments. Anything that would
/// need evaluating (identifiers, calls, spreads, templates) is rejected.
pub fn parse_schema(text: &str) -> SectionResult<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }
    debug!("Schema is not plain JSON, reading it as JSON5");
    json5::from_str(text).map_err(|error| SectionError::invalid_schema(error.to_string()))
}

/// The Liquid block a schema compiles to
pub fn schema_block(schema: &Value) -> SectionResult<String> {
    let json = serde_json::to_string_pretty(schema)
        .map_err(|error| SectionError::invalid_schema(error.to_string()))?;
    Ok(format!("{{% schema %}}\n{}\n{{% endschema %}}", json))
}

/// Replace the `<script id="schema">` element with a schema block. Only
/// the first such element is compiled; a document has one schema.
#[instrument(skip_all, fields(path = %document.path().display()))]
pub fn schema_pass(document: &Document) -> SectionResult<Document> {
    let elements = document.elements(RawTag::Script)?;
    let Some(element) = elements.iter().find(|e| e.has_attribute("id", "schema")) else {
        debug!("No schema element");
        return Ok(document.clone());
    };

    let schema = parse_schema(element.content(document.source()).trim())?;
    let block = schema_block(&schema)?;
    Ok(document.splice(vec![(element.span.clone(), block)]))
}
