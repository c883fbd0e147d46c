//! Surface forms of placeholders inside host text.

use liquify_liquid::Token;
use std::ops::Range;

/// How a token is written into host text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// A bare numeric literal: `123456789012345`
    Bare,
    /// A numeric literal inside a block comment: `/*123456789012345*/`
    BlockComment,
}

impl Encoding {
    /// Text written in place of a fragment
    pub fn surface(&self, token: Token) -> String {
        match self {
            Encoding::Bare => token.to_string(),
            Encoding::BlockComment => format!("/*{}*/", token),
        }
    }

    /// Byte ranges of every occurrence of `token`'s surface form in
    /// `haystack`, left to right and non-overlapping.
    ///
    /// Bare tokens only match inside an integer whose digit count is a
    /// multiple of the token width, at a chunk boundary: adjacent
    /// placeholders concatenate into one run, while a token's digits inside
    /// some unrelated longer number or a decimal are never matched. Comment
    /// tokens tolerate whitespace inside the comment delimiters, as printers
    /// often add it.
    pub fn find_all(&self, haystack: &str, token: Token) -> Vec<Range<usize>> {
        match self {
            Encoding::Bare => find_bare(haystack, &token.to_string()),
            Encoding::BlockComment => find_comment(haystack, &token.to_string()),
        }
    }
}

fn find_bare(haystack: &str, digits: &str) -> Vec<Range<usize>> {
    let width = digits.len();
    integer_runs(haystack)
        .into_iter()
        .filter(|run| run.len() % width == 0)
        .flat_map(|run| (run.start..run.end).step_by(width).map(move |s| s..s + width))
        .filter(|chunk| &haystack[chunk.clone()] == digits)
        .collect()
}

/// Maximal runs of ASCII digits that form an integer on their own. Runs
/// that are the integer or fractional part of a decimal number are left
/// out.
fn integer_runs(haystack: &str) -> Vec<Range<usize>> {
    let bytes = haystack.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }

        let fraction_before =
            start >= 2 && bytes[start - 1] == b'.' && bytes[start - 2].is_ascii_digit();
        let fraction_after =
            i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit();
        if !fraction_before && !fraction_after {
            runs.push(start..i);
        }
    }

    runs
}

fn find_comment(haystack: &str, digits: &str) -> Vec<Range<usize>> {
    let bytes = haystack.as_bytes();
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = haystack[cursor..].find("/*") {
        let start = cursor + offset;
        let mut i = skip_whitespace(bytes, start + 2);

        if bytes[i..].starts_with(digits.as_bytes()) {
            i = skip_whitespace(bytes, i + digits.len());
            if bytes[i..].starts_with(b"*/") {
                found.push(start..i + 2);
                cursor = i + 2;
                continue;
            }
        }
        cursor = start + 2;
    }

    found
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}
