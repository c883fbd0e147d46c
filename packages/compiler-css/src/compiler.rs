//! SCSS to expanded CSS through grass

use crate::error::{StyleError, StyleResult};
use liquify_common::{StyleCompiler, ToolchainError, ToolchainResult};
use tracing::{debug, instrument};

/// Built-in compiler for section `<style type="text/scss">` blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct SassCompiler;

impl StyleCompiler for SassCompiler {
    fn compile(&self, source: &str) -> ToolchainResult<String> {
        compile_scss(source).map_err(|error| ToolchainError::rejected("scss", error.to_string()))
    }
}

/// Compile SCSS to expanded CSS ending in a single newline
#[instrument(skip(source), fields(len = source.len()))]
pub fn compile_scss(source: &str) -> StyleResult<String> {
    let options = grass::Options::default().style(grass::OutputStyle::Expanded);
    let css = grass::from_string(source.to_string(), &options)
        .map_err(|error| StyleError::sass(error.to_string()))?;

    debug!(out = css.len(), "Compiled style sheet");
    let css = css.trim_end();
    Ok(if css.is_empty() {
        String::new()
    } else {
        format!("{}\n", css)
    })
}
