use thiserror::Error;

pub type StyleResult<T> = Result<T, StyleError>;

/// A style sheet the Sass compiler refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("{message}")]
    Sass { message: String },
}

impl StyleError {
    pub fn sass(message: impl Into<String>) -> Self {
        Self::Sass {
            message: message.into(),
        }
    }
}
