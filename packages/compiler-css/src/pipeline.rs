//! Style sheets with Liquid fragments, through a style compiler and back

use liquify_bridge::{BridgeResult, HydrationMiss, PipelineAdapter};
use liquify_common::StyleCompiler;
use tracing::{instrument, warn};

/// Compiled CSS with every surviving fragment restored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOutput {
    pub css: String,
    pub misses: Vec<HydrationMiss>,
}

/// Tokenize `source` for the style-sheet host, compile it, and hydrate the
/// result. Tags travel as `/*<token>*/` comments, variables as bare numbers,
/// so a variable is only valid where the compiler accepts a number.
#[instrument(skip(source, compiler), fields(len = source.len()))]
pub fn compile_style(
    source: &str,
    compiler: &dyn StyleCompiler,
    salt: &str,
) -> BridgeResult<StyleOutput> {
    let adapter = PipelineAdapter::style_sheet(salt);
    let hydrated = adapter.run(source, "style", |tokenized| compiler.compile(tokenized))?;

    if !hydrated.is_complete() {
        warn!(misses = hydrated.misses.len(), "Style compiler dropped fragments");
    }

    Ok(StyleOutput {
        css: hydrated.output,
        misses: hydrated.misses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SassCompiler;
    use liquify_bridge::BridgeError;

    #[test]
    fn test_fragments_in_nested_rules() {
        let source = ".hero {\n  color: {{ section.settings.color }};\n  .title { {% if section.settings.bold %}font-weight: 700;{% endif %} }\n}";
        let output = compile_style(source, &SassCompiler, "").unwrap();
        let css = &output.css;

        assert!(css.starts_with(".hero {\n  color: {{ section.settings.color }};\n}\n"));
        let rule = css.find(".hero .title {").unwrap();
        let open = css.find("{% if section.settings.bold %}").unwrap();
        let declaration = css.find("font-weight: 700;").unwrap();
        let close = css.find("{% endif %}").unwrap();
        assert!(rule < open && open < declaration && declaration < close);
        assert!(output.misses.is_empty());
    }

    #[test]
    fn test_variables_pass_through_sass_functions_as_numbers() {
        let source = "$base: {{ settings.size }}px;\n.a { padding: $base; }";
        let output = compile_style(source, &SassCompiler, "").unwrap();
        assert_eq!(output.css, ".a {\n  padding: {{ settings.size }}px;\n}\n");
    }

    #[test]
    fn test_compile_error_carries_tokenized_source() {
        let err = compile_style(".a { color: {{ c }};", &SassCompiler, "").unwrap_err();
        match err {
            BridgeError::Downstream {
                stage,
                tokenized_source,
                ..
            } => {
                assert_eq!(stage, "style");
                assert!(tokenized_source.starts_with(".a { color: "));
                assert!(!tokenized_source.contains("{{"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
