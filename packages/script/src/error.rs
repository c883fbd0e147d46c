use crate::ast::Span;
use thiserror::Error;

pub type ScriptResult<T> = Result<T, ScriptError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("Unexpected token at {}: expected {expected}, found {found}", span.start)]
    UnexpectedToken {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of file: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Unterminated {what} at {}", span.start)]
    Unterminated { span: Span, what: String },

    #[error("Unrecognized input at {}", span.start)]
    LexError { span: Span },
}

impl ScriptError {
    pub fn unexpected_token(
        span: Span,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            expected: expected.into(),
        }
    }

    pub fn unterminated(span: Span, what: impl Into<String>) -> Self {
        Self::Unterminated {
            span,
            what: what.into(),
        }
    }

    pub fn lex_error(span: Span) -> Self {
        Self::LexError { span }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ScriptError::UnexpectedToken { span, .. }
            | ScriptError::Unterminated { span, .. }
            | ScriptError::LexError { span } => Some(*span),
            ScriptError::UnexpectedEof { .. } => None,
        }
    }
}

/// Pretty-print errors with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_errors(source: &str, filename: &str, errors: &[ScriptError]) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();

    for error in errors {
        let span = error.span().unwrap_or(Span {
            start: source.len().saturating_sub(1),
            end: source.len(),
        });

        let report = Report::build(ReportKind::Error, filename, span.start)
            .with_message(error.to_string())
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_color(Color::Red)
                    .with_message(match error {
                        ScriptError::UnexpectedToken { expected, .. }
                        | ScriptError::UnexpectedEof { expected } => {
                            format!("expected {}", expected)
                        }
                        ScriptError::Unterminated { what, .. } => format!("{} starts here", what),
                        ScriptError::LexError { .. } => "not valid here".to_string(),
                    }),
            )
            .finish();

        if report
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            break;
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}

#[cfg(all(test, feature = "pretty-errors"))]
mod tests {
    use super::*;

    #[test]
    fn test_format_errors_mentions_file_and_message() {
        let source = "const a = `unfinished";
        let error = ScriptError::unterminated(Span::new(10, 11), "template literal");
        let formatted = format_errors(source, "section.jsx", &[error]);
        assert!(formatted.contains("section.jsx"));
        assert!(formatted.contains("Unterminated template literal"));
    }
}
