//! Transpile and render a component whose source carries Liquid fragments

use crate::markup::strip_preload_links;
use liquify_bridge::{BridgeError, BridgeResult, HydrationMiss, PipelineAdapter};
use liquify_common::{ComponentRenderer, ToolchainError, Transpiler};
use tracing::{debug, instrument, warn};

/// A compiled component: client script and server-rendered markup, both
/// with Liquid restored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentOutput {
    pub js: String,
    pub html: String,
    /// Fragments the transpiled script lost
    pub misses: Vec<HydrationMiss>,
}

/// Compile one component.
///
/// Fragments are replaced by numeric literals before the transpiler sees the
/// source. The renderer runs on the tokenized script, so placeholders reach
/// the markup as plain text and are hydrated afterwards. A fragment that
/// only feeds client-side behaviour never reaches the markup; that is not a
/// miss.
#[instrument(skip(source, transpiler, renderer), fields(len = source.len()))]
pub fn compile_component(
    source: &str,
    transpiler: &dyn Transpiler,
    renderer: &dyn ComponentRenderer,
    salt: &str,
) -> BridgeResult<ComponentOutput> {
    let adapter = PipelineAdapter::component(salt);
    let tokenized = adapter.tokenize(source)?;

    let transpiled = transpiler
        .transform(tokenized.source())
        .and_then(|transpiled| {
            if transpiled.errors.is_empty() {
                Ok(transpiled.code)
            } else {
                Err(ToolchainError::Diagnostics {
                    tool: "transpiler".to_string(),
                    errors: transpiled.errors,
                })
            }
        })
        .map_err(|error| BridgeError::downstream("transpile", tokenized.source(), error))?;

    let js = tokenized.hydrate(&transpiled);
    if !js.is_complete() {
        warn!(misses = js.misses.len(), "Transpiler dropped fragments");
    }

    let rendered = renderer
        .render(&transpiled)
        .map_err(|error| BridgeError::downstream("render", transpiled.as_str(), error))?;
    let html = tokenized.hydrate(&strip_preload_links(&rendered));
    debug!(
        unrendered = html.misses.len(),
        "Rendered component markup"
    );

    Ok(ComponentOutput {
        js: js.output,
        html: html.output,
        misses: js.misses,
    })
}
