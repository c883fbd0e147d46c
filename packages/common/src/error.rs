use thiserror::Error;

/// Failure reported by an external toolchain (formatter, transpiler,
/// style compiler, renderer).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolchainError {
    #[error("{tool} rejected its input: {message}")]
    Rejected { tool: String, message: String },

    #[error("{tool} reported {} error(s): {}", errors.len(), errors.join("; "))]
    Diagnostics { tool: String, errors: Vec<String> },

    #[error("could not run {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("{tool} exited with status {status}: {stderr}")]
    ExitStatus {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("no {tool} is configured")]
    NotConfigured { tool: String },
}

impl ToolchainError {
    pub fn rejected(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn not_configured(tool: impl Into<String>) -> Self {
        Self::NotConfigured { tool: tool.into() }
    }
}
