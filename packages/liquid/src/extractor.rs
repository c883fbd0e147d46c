//! Locate Liquid fragments in arbitrary host text.

use crate::fragment::{Fragment, FragmentKind, Fragments, Position};
use crate::parser::parse_output;
use crate::token::generate_token;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{%(.*?)%\}").expect("tag pattern is valid"));

static VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{-?\s*([^{}]*?)\s*-?\}\}").expect("variable pattern is valid")
});

/// Extract tag and variable fragments from `source`.
///
/// Variables are validated against the Liquid output grammar; candidates
/// that fail to parse, or that sit inside a tag, are left alone. The
/// resulting fragments never overlap.
#[instrument(skip(source, salt), fields(len = source.len()))]
pub fn extract(source: &str, salt: &str) -> Fragments {
    let tags = extract_tags(source, salt);
    let variables: Vec<Fragment> = extract_variables(source, salt)
        .into_iter()
        .filter(|variable| {
            let nested = tags
                .iter()
                .any(|tag| tag.position.overlaps(&variable.position));
            if nested {
                debug!(source = %variable.source, "Skipping interpolation inside a tag");
            }
            !nested
        })
        .collect();

    debug!(
        tags = tags.len(),
        variables = variables.len(),
        "Extracted Liquid fragments"
    );
    Fragments { tags, variables }
}

/// Every `{% ... %}` span, matched lazily across newlines
pub fn extract_tags(source: &str, salt: &str) -> Vec<Fragment> {
    TAG_PATTERN
        .captures_iter(source)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let inner = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            Some(Fragment::new(
                FragmentKind::Tag,
                Position::new(whole.start(), whole.end()),
                whole.as_str(),
                strip_whitespace_control(inner),
                generate_token(whole.as_str(), salt),
            ))
        })
        .collect()
}

/// Every `{{ ... }}` span whose markup parses as one Liquid output
pub fn extract_variables(source: &str, salt: &str) -> Vec<Fragment> {
    VARIABLE_PATTERN
        .captures_iter(source)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let inner = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

            if let Err(error) = parse_output(inner) {
                debug!(candidate = %whole.as_str(), %error, "Rejected interpolation candidate");
                return None;
            }

            Some(Fragment::new(
                FragmentKind::Variable,
                Position::new(whole.start(), whole.end()),
                whole.as_str(),
                inner.trim(),
                generate_token(whole.as_str(), salt),
            ))
        })
        .collect()
}

fn strip_whitespace_control(inner: &str) -> &str {
    let inner = inner.strip_prefix('-').unwrap_or(inner);
    let inner = inner.strip_suffix('-').unwrap_or(inner);
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tags_in_order() {
        let fragments = extract("{% if a %}x{% endif %}", "");
        let sources: Vec<_> = fragments.tags.iter().map(|f| f.source.as_str()).collect();
        assert_eq!(sources, vec!["{% if a %}", "{% endif %}"]);
        assert_eq!(fragments.tags[0].inner_source, "if a");
        assert_eq!(fragments.tags[0].position, Position::new(0, 10));
        assert_eq!(fragments.tags[1].position, Position::new(11, 22));
    }

    #[test]
    fn test_extract_multiline_tag() {
        let source = "{% liquid\n  assign a = 1\n  echo a\n%}";
        let fragments = extract(source, "");
        assert_eq!(fragments.tags.len(), 1);
        assert_eq!(fragments.tags[0].source, source);
    }

    #[test]
    fn test_tag_whitespace_control_is_stripped_from_inner() {
        let fragments = extract("{%- render 'card' -%}", "");
        assert_eq!(fragments.tags[0].inner_source, "render 'card'");
    }

    #[test]
    fn test_extract_variables() {
        let fragments = extract("color: {{ settings.color }}; {{- title | upcase -}}", "");
        assert_eq!(fragments.variables.len(), 2);
        assert_eq!(fragments.variables[0].inner_source, "settings.color");
        assert_eq!(fragments.variables[1].source, "{{- title | upcase -}}");
        assert_eq!(fragments.variables[1].inner_source, "title | upcase");
    }

    #[test]
    fn test_reject_non_liquid_double_braces() {
        let fragments = extract("{{ }} {{ a b }} {{ color: red }} {{ ok }}", "");
        let sources: Vec<_> = fragments
            .variables
            .iter()
            .map(|f| f.source.as_str())
            .collect();
        assert_eq!(sources, vec!["{{ ok }}"]);
    }

    #[test]
    fn test_variable_inside_tag_is_not_extracted() {
        let fragments = extract(r#"{% assign x = "{{ y }}" %}{{ z }}"#, "");
        assert_eq!(fragments.tags.len(), 1);
        assert_eq!(fragments.variables.len(), 1);
        assert_eq!(fragments.variables[0].source, "{{ z }}");
    }

    #[test]
    fn test_identical_fragments_share_token() {
        let fragments = extract("{{ a }} and {{ a }}", "");
        assert_eq!(fragments.variables.len(), 2);
        assert_eq!(fragments.variables[0].token, fragments.variables[1].token);
        assert_ne!(
            fragments.variables[0].position,
            fragments.variables[1].position
        );
    }

    #[test]
    fn test_fragments_never_overlap() {
        let source = r#"
            {% for b in section.blocks %}
              <div data-x="{{ b.id }}">{{ b.settings.title | escape }}</div>
              {% comment %}{{ not | a | problem }}{% endcomment %}
              {% echo "{{ nested }}" %}
            {% endfor %}
        "#;
        let fragments = extract(source, "");
        let ordered = fragments.ordered();
        for (i, a) in ordered.iter().enumerate() {
            for b in ordered.iter().skip(i + 1) {
                assert!(
                    !a.position.overlaps(&b.position),
                    "{:?} overlaps {:?}",
                    a.source,
                    b.source
                );
            }
        }
    }

    #[test]
    fn test_ordered_merges_by_position() {
        let fragments = extract("{{ a }}{% if b %}{{ c }}{% endif %}", "");
        let ordered: Vec<_> = fragments
            .ordered()
            .into_iter()
            .map(|f| f.source.as_str())
            .collect();
        assert_eq!(ordered, vec!["{{ a }}", "{% if b %}", "{{ c }}", "{% endif %}"]);
    }

    #[test]
    fn test_normalized_source() {
        let fragments = extract(r#"{{ "now" | date: "%Y" }}"#, "");
        assert_eq!(
            fragments.variables[0].normalized_source,
            "{{ 'now' | date: '%Y' }}"
        );
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let source = "é {{ a }}";
        let fragments = extract(source, "");
        let position = fragments.variables[0].position;
        assert_eq!(&source[position.start..position.end], "{{ a }}");
    }
}
