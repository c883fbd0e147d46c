//! Deterministic numeric placeholders for Liquid fragments.
//!
//! A token is a pure function of the fragment text and an explicit salt, so
//! tokenize and hydrate can run in separate passes (even separate processes)
//! and still agree on every placeholder.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of hex digits of the digest that feed a token
const DIGEST_HEX_DIGITS: usize = 15;

/// Smallest token value; every token has exactly `TOKEN_WIDTH` digits
const TOKEN_MIN: u64 = 100_000_000_000_000;
/// Size of the token range `[TOKEN_MIN, 10^TOKEN_WIDTH)`
const TOKEN_SPAN: u64 = 900_000_000_000_000;

/// Decimal width of every token. Values stay below 2^53 so a style compiler
/// that stores numbers as doubles prints them back unchanged.
pub const TOKEN_WIDTH: usize = 15;

/// A placeholder identifier standing in for one fragment text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Token(u64);

impl Token {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive the token for a fragment's exact source text
pub fn generate_token(source: &str, salt: &str) -> Token {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(source.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    // 15 hex digits always fit in a u64
    let numeric = u64::from_str_radix(&digest[..DIGEST_HEX_DIGITS], 16).unwrap_or_default();
    Token(TOKEN_MIN + numeric % TOKEN_SPAN)
}
