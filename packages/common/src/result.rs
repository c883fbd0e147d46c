use crate::error::ToolchainError;

/// Result of a call into an external toolchain
pub type ToolchainResult<T> = Result<T, ToolchainError>;
