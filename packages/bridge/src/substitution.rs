//! Tokenize and hydrate: the two inverse substitutions around an external
//! transform.

use crate::encoding::Encoding;
use crate::error::{BridgeError, BridgeResult, HydrationMiss};
use liquify_liquid::{Fragment, FragmentKind, Position, Token};
use std::collections::HashMap;
use std::ops::Range;
use tracing::{debug, warn};

/// Which text a placeholder is turned back into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// The fragment exactly as written
    Original,
    /// The fragment with double quotes turned into single quotes
    Normalized,
}

impl Restore {
    fn text<'f>(&self, fragment: &'f Fragment) -> &'f str {
        match self {
            Restore::Original => &fragment.source,
            Restore::Normalized => &fragment.normalized_source,
        }
    }
}

/// Output of a hydration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hydrated {
    pub output: String,
    pub misses: Vec<HydrationMiss>,
}

impl Hydrated {
    pub fn is_complete(&self) -> bool {
        self.misses.is_empty()
    }
}

/// Replace each fragment's text with its encoded placeholder.
///
/// Fragments are visited in source order and each replaces the first
/// remaining literal occurrence of its text, so identical fragments are
/// consumed left to right. Fragments whose kind has no encoding stay as
/// they are.
pub fn tokenize<'f, E>(
    source: &str,
    fragments: impl IntoIterator<Item = &'f Fragment>,
    encoding: E,
) -> BridgeResult<String>
where
    E: Fn(FragmentKind) -> Option<Encoding>,
{
    let mut ordered: Vec<&Fragment> = fragments.into_iter().collect();
    ordered.sort_by_key(|f| f.position.start);
    check_collisions(&ordered)?;

    let mut checked: HashMap<Token, ()> = HashMap::new();
    let mut output = source.to_string();

    for fragment in ordered {
        let Some(encoding) = encoding(fragment.kind) else {
            continue;
        };

        if checked.insert(fragment.token, ()).is_none()
            && !encoding.find_all(source, fragment.token).is_empty()
        {
            return Err(BridgeError::TokenAlreadyPresent {
                surface: encoding.surface(fragment.token),
                fragment: fragment.source.clone(),
            });
        }

        let Some(start) = output.find(&fragment.source) else {
            debug!(fragment = %fragment.source, "Fragment text not found, nothing to tokenize");
            continue;
        };
        let end = start + fragment.source.len();

        if encoding == Encoding::Bare && touches_digit(source, &fragment.position) {
            warn!(
                fragment = %fragment.source,
                "Placeholder sits next to a digit and may not be restored"
            );
        }

        output.replace_range(start..end, &encoding.surface(fragment.token));
    }

    Ok(output)
}

/// Replace every placeholder in `transformed` with the text of its fragment.
///
/// Matching looks only at the encoded token, never at surrounding context,
/// so whitespace changes and reordering by the external toolchain are
/// tolerated. A placeholder that no longer appears is reported as a miss
/// and its fragment text is left out of the output.
pub fn hydrate<'f, E>(
    transformed: &str,
    fragments: impl IntoIterator<Item = &'f Fragment>,
    encoding: E,
    restore: Restore,
) -> Hydrated
where
    E: Fn(FragmentKind) -> Option<Encoding>,
{
    let mut seen: HashMap<Token, ()> = HashMap::new();
    let mut replacements: Vec<(Range<usize>, &str)> = Vec::new();
    let mut misses = Vec::new();

    for fragment in fragments {
        if seen.insert(fragment.token, ()).is_some() {
            continue;
        }
        let Some(encoding) = encoding(fragment.kind) else {
            continue;
        };

        let ranges = encoding.find_all(transformed, fragment.token);
        if ranges.is_empty() {
            warn!(
                token = %fragment.token,
                fragment = %fragment.source,
                "Placeholder missing from transformed output"
            );
            misses.push(HydrationMiss {
                token: fragment.token,
                kind: fragment.kind,
                source: fragment.source.clone(),
            });
            continue;
        }

        let text = restore.text(fragment);
        replacements.extend(ranges.into_iter().map(|range| (range, text)));
    }

    replacements.sort_by_key(|(range, _)| range.start);

    let mut output = String::with_capacity(transformed.len());
    let mut cursor = 0;
    for (range, text) in replacements {
        // Ranges of distinct tokens cannot overlap
        if range.start < cursor {
            continue;
        }
        output.push_str(&transformed[cursor..range.start]);
        output.push_str(text);
        cursor = range.end;
    }
    output.push_str(&transformed[cursor..]);

    Hydrated { output, misses }
}

fn check_collisions(fragments: &[&Fragment]) -> BridgeResult<()> {
    let mut by_token: HashMap<Token, &str> = HashMap::new();
    for fragment in fragments {
        match by_token.get(&fragment.token) {
            Some(existing) if *existing != fragment.source => {
                return Err(BridgeError::TokenCollision {
                    token: fragment.token,
                    first: existing.to_string(),
                    second: fragment.source.clone(),
                });
            }
            Some(_) => {}
            None => {
                by_token.insert(fragment.token, &fragment.source);
            }
        }
    }
    Ok(())
}

/// Whether the host text right before or after a fragment is a digit
fn touches_digit(source: &str, position: &Position) -> bool {
    let bytes = source.as_bytes();
    let before = position
        .start
        .checked_sub(1)
        .and_then(|i| bytes.get(i))
        .map(|b| b.is_ascii_digit())
        .unwrap_or(false);
    let after = bytes
        .get(position.end)
        .map(|b| b.is_ascii_digit())
        .unwrap_or(false);
    before || after
}
