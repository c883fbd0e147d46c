use liquify_bridge::BridgeError;
use liquify_common::ToolchainError;
use liquify_script::{ScriptError, Unresolved};
use thiserror::Error;

pub type SectionResult<T> = Result<T, SectionError>;

/// Reasons a section, snippet or module fails to compile
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SectionError {
    #[error("schema is not a data literal: {message}")]
    InvalidSchema { message: String },

    #[error("<{tag}> opened at line {line} is never closed")]
    Unclosed { tag: &'static str, line: usize },

    #[error("export `{export}` could not be resolved: {reason}")]
    UnresolvedExport { export: String, reason: Unresolved },

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("script syntax error: {0}")]
    Script(#[from] ScriptError),

    #[error("{stage} failed: {error}")]
    Toolchain {
        stage: &'static str,
        #[source]
        error: ToolchainError,
    },
}

impl SectionError {
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    pub fn toolchain(stage: &'static str, error: ToolchainError) -> Self {
        Self::Toolchain { stage, error }
    }
}
