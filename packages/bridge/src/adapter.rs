//! Per-host wrapping of an external transform: tokenize, transform, hydrate.

use crate::encoding::Encoding;
use crate::error::{BridgeError, BridgeResult};
use crate::substitution::{hydrate, tokenize, Hydrated, Restore};
use liquify_common::ToolchainResult;
use liquify_liquid::{extract, FragmentKind, Fragments};
use tracing::{debug, instrument};

/// The kind of text an external toolchain consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// SCSS-like style sheets. Tags become comments so they survive as
    /// statements; variables become bare numbers usable as values.
    StyleSheet,
    /// Plain markup where Liquid is left in place.
    Markup,
    /// JSX-like component source. Restored text uses single quotes so it can
    /// sit inside double-quoted attributes.
    Component,
}

impl Host {
    pub fn encoding(&self, kind: FragmentKind) -> Option<Encoding> {
        match (self, kind) {
            (Host::StyleSheet, FragmentKind::Tag) => Some(Encoding::BlockComment),
            (Host::StyleSheet, FragmentKind::Variable) => Some(Encoding::Bare),
            (Host::Markup, _) => None,
            (Host::Component, _) => Some(Encoding::Bare),
        }
    }

    pub fn restore(&self) -> Restore {
        match self {
            Host::StyleSheet | Host::Markup => Restore::Original,
            Host::Component => Restore::Normalized,
        }
    }
}

/// Wraps external transforms for one host kind
#[derive(Debug, Clone)]
pub struct PipelineAdapter {
    host: Host,
    salt: String,
}

impl PipelineAdapter {
    pub fn new(host: Host, salt: impl Into<String>) -> Self {
        Self {
            host,
            salt: salt.into(),
        }
    }

    pub fn style_sheet(salt: impl Into<String>) -> Self {
        Self::new(Host::StyleSheet, salt)
    }

    pub fn markup(salt: impl Into<String>) -> Self {
        Self::new(Host::Markup, salt)
    }

    pub fn component(salt: impl Into<String>) -> Self {
        Self::new(Host::Component, salt)
    }

    pub fn host(&self) -> Host {
        self.host
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Extract fragments from `source` and replace them with placeholders.
    ///
    /// The returned value is the only way to hydrate, so a transform's output
    /// can never be hydrated against fragments of another document.
    #[instrument(skip(self, source), fields(host = ?self.host, len = source.len()))]
    pub fn tokenize(&self, source: &str) -> BridgeResult<Tokenized> {
        let fragments = extract(source, &self.salt);
        let host = self.host;
        let tokenized = tokenize(source, fragments.ordered(), |kind| host.encoding(kind))?;
        debug!(fragments = fragments.len(), "Tokenized source");

        Ok(Tokenized {
            host,
            source: tokenized,
            fragments,
        })
    }

    /// Tokenize, run `transform` on the tokenized text, then hydrate.
    ///
    /// A failing transform becomes [`BridgeError::Downstream`] carrying the
    /// tokenized text the toolchain saw.
    pub fn run<F>(&self, source: &str, stage: &str, transform: F) -> BridgeResult<Hydrated>
    where
        F: FnOnce(&str) -> ToolchainResult<String>,
    {
        let tokenized = self.tokenize(source)?;
        let transformed = transform(tokenized.source())
            .map_err(|error| BridgeError::downstream(stage, tokenized.source(), error))?;
        Ok(tokenized.hydrate(&transformed))
    }
}

/// Placeholder text together with the fragments it stands for
#[derive(Debug, Clone)]
pub struct Tokenized {
    host: Host,
    source: String,
    fragments: Fragments,
}

impl Tokenized {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn fragments(&self) -> &Fragments {
        &self.fragments
    }

    pub fn host(&self) -> Host {
        self.host
    }

    /// Restore fragments in `transformed` the way the host expects
    pub fn hydrate(&self, transformed: &str) -> Hydrated {
        self.hydrate_with(transformed, self.host.restore())
    }

    pub fn hydrate_with(&self, transformed: &str, restore: Restore) -> Hydrated {
        let host = self.host;
        hydrate(
            transformed,
            self.fragments.ordered(),
            |kind| host.encoding(kind),
            restore,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquify_common::ToolchainError;

    #[test]
    fn test_style_sheet_encodings() {
        let adapter = PipelineAdapter::style_sheet("");
        let tokenized = adapter
            .tokenize("a { color: {{ c }}; {% if x %}b: 1;{% endif %} }")
            .unwrap();
        let source = tokenized.source();
        assert!(!source.contains("{{"));
        assert_eq!(source.matches("/*").count(), 2);
        let var = &tokenized.fragments().variables[0];
        assert!(source.contains(&format!("color: {};", var.token)));
    }

    #[test]
    fn test_markup_is_identity() {
        let adapter = PipelineAdapter::markup("");
        let source = "<p>{{ a }}</p>{% if b %}x{% endif %}";
        let hydrated = adapter.run(source, "format", |s| Ok(s.to_string())).unwrap();
        assert_eq!(hydrated.output, source);
        assert!(hydrated.is_complete());
    }

    #[test]
    fn test_component_restores_single_quotes() {
        let adapter = PipelineAdapter::component("");
        let source = r#"<img alt={"{{ "hi" | t }}"} />"#;
        let hydrated = adapter.run(source, "transpile", |s| Ok(s.to_string())).unwrap();
        assert_eq!(hydrated.output, r#"<img alt={"{{ 'hi' | t }}"} />"#);
    }

    #[test]
    fn test_run_maps_failure_to_downstream() {
        let adapter = PipelineAdapter::style_sheet("");
        let err = adapter
            .run("a { b: {{ c }} }", "style", |_| {
                Err(ToolchainError::rejected("sass", "expected \"}\""))
            })
            .unwrap_err();

        match err {
            BridgeError::Downstream {
                stage,
                tokenized_source,
                ..
            } => {
                assert_eq!(stage, "style");
                assert!(!tokenized_source.contains("{{"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_salt_changes_placeholders() {
        let a = PipelineAdapter::component("one").tokenize("{{ x }}").unwrap();
        let b = PipelineAdapter::component("two").tokenize("{{ x }}").unwrap();
        assert_ne!(a.source(), b.source());
    }
}
