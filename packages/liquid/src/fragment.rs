use crate::token::Token;
use serde::Serialize;

/// Which Liquid construct a fragment is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FragmentKind {
    /// `{% ... %}` statement tag
    Tag,
    /// `{{ ... }}` interpolation
    Variable,
}

/// Byte range of a fragment in the text it was extracted from; `end` is
/// exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Position) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &Position) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// One occurrence of Liquid syntax in host text. Never mutated after
/// extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub position: Position,
    /// Markup between the delimiters, without whitespace-control dashes
    pub inner_source: String,
    /// Exact original text, delimiters included
    pub source: String,
    /// `source` with double quotes turned into single quotes, safe to embed
    /// in double-quoted HTML attributes
    pub normalized_source: String,
    pub kind: FragmentKind,
    pub token: Token,
}

impl Fragment {
    pub fn new(
        kind: FragmentKind,
        position: Position,
        source: &str,
        inner_source: &str,
        token: Token,
    ) -> Self {
        Self {
            position,
            inner_source: inner_source.to_string(),
            source: source.to_string(),
            normalized_source: normalize_quotes(source),
            kind,
            token,
        }
    }
}

/// Replace every double quote with a single quote
pub fn normalize_quotes(source: &str) -> String {
    source.replace('"', "'")
}

/// Tag and variable fragments of one document, each in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fragments {
    pub tags: Vec<Fragment>,
    pub variables: Vec<Fragment>,
}

impl Fragments {
    pub fn len(&self) -> usize {
        self.tags.len() + self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.variables.is_empty()
    }

    /// All fragments merged in source order
    pub fn ordered(&self) -> Vec<&Fragment> {
        let mut all: Vec<&Fragment> = self.tags.iter().chain(&self.variables).collect();
        all.sort_by_key(|f| f.position.start);
        all
    }

    /// Owned version of [`Fragments::ordered`]
    pub fn into_ordered(self) -> Vec<Fragment> {
        let mut all: Vec<Fragment> = self.tags.into_iter().chain(self.variables).collect();
        all.sort_by_key(|f| f.position.start);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_overlap() {
        let a = Position::new(0, 5);
        assert!(a.overlaps(&Position::new(4, 8)));
        assert!(!a.overlaps(&Position::new(5, 8)));
        assert!(a.contains(&Position::new(1, 3)));
    }

    #[test]
    fn test_normalize_quotes() {
        assert_eq!(
            normalize_quotes(r#"{{ "now" | date: "%Y" }}"#),
            "{{ 'now' | date: '%Y' }}"
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let fragment = Fragment::new(
            FragmentKind::Tag,
            Position::new(0, 10),
            "{% if x %}",
            "if x",
            crate::token::generate_token("{% if x %}", ""),
        );
        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(json["innerSource"], "if x");
        assert_eq!(json["normalizedSource"], "{% if x %}");
        assert_eq!(json["token"], 807_546_766_127_176u64);
    }
}
