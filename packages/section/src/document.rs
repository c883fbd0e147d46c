//! Section documents as immutable values, and the raw-text elements the
//! compiler rewrites in them

use crate::error::{SectionError, SectionResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::path::{Path, PathBuf};

static SCRIPT_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<script\b([^>]*)>").expect("script pattern is valid"));
static SCRIPT_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</script\s*>").expect("script pattern is valid"));
static STYLE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<style\b([^>]*)>").expect("style pattern is valid"));
static STYLE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</style\s*>").expect("style pattern is valid"));
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("attribute pattern is valid")
});

/// A section or snippet source together with the path imports resolve
/// against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    source: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_source(self) -> String {
        self.source
    }

    /// The same document with `source` replaced
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        Self::new(self.path.clone(), source)
    }

    /// A new document with each range replaced by its text. Ranges must not
    /// overlap.
    pub fn splice(&self, mut edits: Vec<(Range<usize>, String)>) -> Self {
        edits.sort_by_key(|(range, _)| range.start);

        let mut source = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for (range, text) in edits {
            source.push_str(&self.source[cursor..range.start]);
            source.push_str(&text);
            cursor = range.end;
        }
        source.push_str(&self.source[cursor..]);

        self.with_source(source)
    }

    pub fn elements(&self, tag: RawTag) -> SectionResult<Vec<Element>> {
        find_elements(&self.source, tag)
    }
}

/// Elements whose content is raw text rather than markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTag {
    Script,
    Style,
}

impl RawTag {
    pub fn name(&self) -> &'static str {
        match self {
            RawTag::Script => "script",
            RawTag::Style => "style",
        }
    }

    fn patterns(&self) -> (&'static Regex, &'static Regex) {
        match self {
            RawTag::Script => (&SCRIPT_OPEN, &SCRIPT_CLOSE),
            RawTag::Style => (&STYLE_OPEN, &STYLE_CLOSE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// One raw-text element of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: RawTag,
    /// From `<` of the opening tag through `>` of the closing tag
    pub span: Range<usize>,
    pub content: Range<usize>,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name.eq_ignore_ascii_case(name))
            .map(|attribute| attribute.value.as_deref().unwrap_or(""))
    }

    pub fn has_attribute(&self, name: &str, value: &str) -> bool {
        self.attribute(name) == Some(value)
    }

    pub fn content<'src>(&self, source: &'src str) -> &'src str {
        &source[self.content.clone()]
    }

    pub fn outer<'src>(&self, source: &'src str) -> &'src str {
        &source[self.span.clone()]
    }

    /// The opening tag rebuilt without the attribute `name`
    pub fn opening_tag_without(&self, name: &str) -> String {
        let mut tag = format!("<{}", self.tag.name());
        for attribute in &self.attributes {
            if attribute.name.eq_ignore_ascii_case(name) {
                continue;
            }
            tag.push(' ');
            tag.push_str(&attribute.name);
            if let Some(value) = &attribute.value {
                tag.push_str(&format!("=\"{}\"", value));
            }
        }
        tag.push('>');
        tag
    }
}

/// Every `tag` element of `source`, in order. Content is not scanned for
/// nested markup, so a `<` inside a script never starts an element.
pub fn find_elements(source: &str, tag: RawTag) -> SectionResult<Vec<Element>> {
    let (open, close) = tag.patterns();
    let mut elements = Vec::new();
    let mut cursor = 0;

    while let Some(opening) = open.captures_at(source, cursor) {
        let (Some(whole), Some(attributes)) = (opening.get(0), opening.get(1)) else {
            break;
        };
        let closing = close
            .find_at(source, whole.end())
            .ok_or_else(|| SectionError::Unclosed {
                tag: tag.name(),
                line: source[..whole.start()].matches('\n').count() + 1,
            })?;

        elements.push(Element {
            tag,
            span: whole.start()..closing.end(),
            content: whole.end()..closing.start(),
            attributes: parse_attributes(attributes.as_str()),
        });
        cursor = closing.end();
    }

    Ok(elements)
}

fn parse_attributes(text: &str) -> Vec<Attribute> {
    ATTRIBUTE
        .captures_iter(text)
        .filter_map(|captures| {
            let name = captures.get(1)?.as_str().to_string();
            let value = captures
                .get(2)
                .or_else(|| captures.get(3))
                .or_else(|| captures.get(4))
                .map(|value| value.as_str().to_string());
            Some(Attribute { name, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_elements_with_attributes() {
        let source = "<div></div>\n<script type=\"text/babel\" defer>const a = b < c;</script>\n<SCRIPT id='schema'>{}</SCRIPT >";
        let elements = find_elements(source, RawTag::Script).unwrap();

        assert_eq!(elements.len(), 2);
        assert!(elements[0].has_attribute("type", "text/babel"));
        assert_eq!(elements[0].attribute("defer"), Some(""));
        assert_eq!(elements[0].content(source), "const a = b < c;");
        assert_eq!(elements[1].attribute("id"), Some("schema"));
        assert_eq!(elements[1].outer(source), "<SCRIPT id='schema'>{}</SCRIPT >");
    }

    #[test]
    fn test_unclosed_element() {
        let err = find_elements("<p>\n<style>a {}", RawTag::Style).unwrap_err();
        assert_eq!(
            err,
            SectionError::Unclosed {
                tag: "style",
                line: 2
            }
        );
    }

    #[test]
    fn test_opening_tag_without() {
        let source = "<style type=\"text/scss\" media=print data-x>a{}</style>";
        let element = &find_elements(source, RawTag::Style).unwrap()[0];
        assert_eq!(
            element.opening_tag_without("type"),
            "<style media=\"print\" data-x>"
        );
    }

    #[test]
    fn test_splice_returns_new_document() {
        let document = Document::new("/s.liquid", "aXbYc");
        let spliced = document.splice(vec![(3..4, "yy".into()), (1..2, "x".into())]);
        assert_eq!(spliced.source(), "axbyyc");
        assert_eq!(document.source(), "aXbYc");
        assert_eq!(spliced.path(), Path::new("/s.liquid"));
    }
}
