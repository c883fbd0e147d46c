use liquify_common::ToolchainError;
use liquify_liquid::{FragmentKind, Token};
use serde::Serialize;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Fatal conditions for a single document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// Two different fragment texts hashed to one token; hydration would
    /// restore the wrong text
    #[error("Token collision: {token} stands for both {first:?} and {second:?}")]
    TokenCollision {
        token: Token,
        first: String,
        second: String,
    },

    /// The placeholder already appears in the host text, so hydration could
    /// not tell it apart from the fragment
    #[error("Placeholder {surface} for {fragment:?} already occurs in the source")]
    TokenAlreadyPresent { surface: String, fragment: String },

    /// The external toolchain rejected the tokenized text
    #[error("{stage} failed: {error}")]
    Downstream {
        stage: String,
        tokenized_source: String,
        #[source]
        error: ToolchainError,
    },
}

impl BridgeError {
    pub fn downstream(
        stage: impl Into<String>,
        tokenized_source: impl Into<String>,
        error: ToolchainError,
    ) -> Self {
        Self::Downstream {
            stage: stage.into(),
            tokenized_source: tokenized_source.into(),
            error,
        }
    }
}

/// A placeholder that did not survive the external transform. Recoverable:
/// the fragment's text is simply absent from the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydrationMiss {
    pub token: Token,
    pub kind: FragmentKind,
    pub source: String,
}
