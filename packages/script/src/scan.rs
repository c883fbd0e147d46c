//! Byte-level scanners for literals whose extent depends on context:
//! template literals, regular expressions and JSX elements.

use crate::ast::Span;
use crate::error::{ScriptError, ScriptResult};
use crate::lexer::skip_block;

/// Length of a template literal after its opening backtick, through the
/// closing backtick. `${ .. }` substitutions may nest strings and templates.
pub fn template_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Some(i + 1),
            b'$' if bytes.get(i + 1) == Some(&b'{') => i = substitution_end(rest, i + 2)?,
            _ => i += 1,
        }
    }

    None
}

/// Index just past the `}` that closes a template substitution
fn substitution_end(src: &str, start: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i + 1),
            b'}' => depth -= 1,
            quote @ (b'"' | b'\'') => {
                i = quoted_end(bytes, i, quote, false)?;
                continue;
            }
            b'`' => {
                i += 1 + template_len(&src[i + 1..])?;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Index just past the closing quote of the string starting at `start`.
/// Plain strings stop at a newline; JSX attribute strings may span lines
/// and have no escapes.
fn quoted_end(bytes: &[u8], start: usize, quote: u8, jsx: bool) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if !jsx => i += 2,
            b'\n' if !jsx => return None,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// End of the regular expression literal starting with `/` at `start`,
/// including its flags
pub fn regex_end(src: &str, start: usize) -> ScriptResult<usize> {
    let bytes = src.as_bytes();
    let mut i = start + 1;
    let mut in_class = false;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => break,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Ok(i);
            }
            _ => i += 1,
        }
    }

    Err(ScriptError::unterminated(
        Span::new(start, start + 1),
        "regular expression",
    ))
}

/// End of the JSX element or fragment whose `<` is at `start`
pub fn jsx_end(src: &str, start: usize) -> ScriptResult<usize> {
    let bytes = src.as_bytes();
    let unterminated = || ScriptError::unterminated(Span::new(start, start + 1), "JSX element");
    let mut i = start + 1;

    // Opening tag: name, attributes, spread attributes
    loop {
        match bytes.get(i) {
            None => return Err(unterminated()),
            Some(b'/') if bytes.get(i + 1) == Some(&b'>') => return Ok(i + 2),
            Some(b'>') => {
                i += 1;
                break;
            }
            Some(b'{') => i = skip_block(src, i + 1)?,
            Some(&quote @ (b'"' | b'\'')) => {
                i = quoted_end(bytes, i, quote, true).ok_or_else(unterminated)?
            }
            Some(_) => i += 1,
        }
    }

    // Children until the matching closing tag
    loop {
        match bytes.get(i) {
            None => return Err(unterminated()),
            Some(b'{') => i = skip_block(src, i + 1)?,
            Some(b'<') => {
                let next = skip_whitespace(bytes, i + 1);
                if bytes.get(next) == Some(&b'/') {
                    let close = bytes[next..]
                        .iter()
                        .position(|b| *b == b'>')
                        .ok_or_else(unterminated)?;
                    return Ok(next + close + 1);
                }
                i = jsx_end(src, i)?;
            }
            Some(_) => i += 1,
        }
    }
}

/// End of a type parameter list opening a generic arrow function, when the
/// `<` at `start` begins one: `<T,>` or `<T extends U>`. JSX otherwise.
pub fn type_params_end(src: &str, start: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let name_start = skip_whitespace(bytes, start + 1);
    let mut i = name_start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
    {
        i += 1;
    }
    if i == name_start || bytes[name_start].is_ascii_digit() {
        return None;
    }

    let after_name = skip_whitespace(bytes, i);
    let generic = match bytes.get(after_name) {
        Some(b',') => true,
        Some(_) => {
            src[after_name..].starts_with("extends")
                && bytes
                    .get(after_name + "extends".len())
                    .map_or(false, |b| b.is_ascii_whitespace())
                && after_name > i
        }
        None => false,
    };
    if !generic {
        return None;
    }

    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'=' if bytes.get(i + 1) == Some(&b'>') => i += 1,
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            quote @ (b'"' | b'\'') => {
                i = quoted_end(bytes, i, quote, false)?;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Decode the escapes of a quoted string literal (quotes included)
pub fn unescape(literal: &str) -> String {
    let inner = if literal.len() >= 2 {
        &literal[1..literal.len() - 1]
    } else {
        literal
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            // Line continuation
            Some('\n') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &hex, "\\x");
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut out, &hex, "\\u");
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

fn push_code_point(out: &mut String, hex: &str, prefix: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => {
            out.push_str(prefix);
            out.push_str(hex);
        }
    }
}
