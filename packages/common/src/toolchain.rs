//! Contracts for the external toolchains the bridge hands tokenized source to.
//!
//! Every collaborator is a synchronous call that either returns text or
//! fails. Implementations hold no hidden global state, so one instance may
//! serve any number of documents.

use crate::error::ToolchainError;
use crate::result::ToolchainResult;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::debug;

/// Language a formatter is asked to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    /// Liquid-flavoured HTML
    Liquid,
    /// Component script (JS/JSX)
    Script,
    /// Style sheet
    Style,
}

impl LanguageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageMode::Liquid => "liquid",
            LanguageMode::Script => "script",
            LanguageMode::Style => "style",
        }
    }
}

/// Output of a structural transform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transpiled {
    pub code: String,
    pub errors: Vec<String>,
}

impl Transpiled {
    pub fn ok(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            errors: Vec::new(),
        }
    }
}

/// Code formatter. Must be idempotent and must leave numeric and comment
/// placeholders untouched.
pub trait Formatter: Send + Sync {
    fn format(&self, source: &str, mode: LanguageMode) -> ToolchainResult<String>;
}

/// Component transpiler (JSX to plain script)
pub trait Transpiler: Send + Sync {
    fn transform(&self, source: &str) -> ToolchainResult<Transpiled>;
}

/// Style-sheet compiler
pub trait StyleCompiler: Send + Sync {
    fn compile(&self, source: &str) -> ToolchainResult<String>;
}

/// Component renderer: a pure function from component definition to markup
pub trait ComponentRenderer: Send + Sync {
    fn render(&self, component: &str) -> ToolchainResult<String>;
}

/// Formatter that returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFormatter;

impl Formatter for IdentityFormatter {
    fn format(&self, source: &str, _mode: LanguageMode) -> ToolchainResult<String> {
        Ok(source.to_string())
    }
}

/// Transpiler that returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranspiler;

impl Transpiler for IdentityTranspiler {
    fn transform(&self, source: &str) -> ToolchainResult<Transpiled> {
        Ok(Transpiled::ok(source))
    }
}

/// Renderer placeholder used when none is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRenderer;

impl ComponentRenderer for UnconfiguredRenderer {
    fn render(&self, _component: &str) -> ToolchainResult<String> {
        Err(ToolchainError::not_configured("renderer"))
    }
}

/// An external program invocation: `program args...`, source on stdin,
/// result on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Toolchain backed by an external command
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    tool: String,
    spec: CommandSpec,
}

impl CommandToolchain {
    pub fn new(tool: impl Into<String>, spec: CommandSpec) -> Self {
        Self {
            tool: tool.into(),
            spec,
        }
    }

    /// Run the command with `input` on stdin. `mode` is exported to the
    /// child as `LIQUIFY_LANGUAGE` so one formatter script can serve all
    /// languages.
    pub fn run(&self, input: &str, mode: Option<LanguageMode>) -> ToolchainResult<String> {
        debug!(tool = %self.tool, program = %self.spec.program, "Running external toolchain");

        let mut command = Command::new(&self.spec.program);
        command
            .args(&self.spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(mode) = mode {
            command.env("LIQUIFY_LANGUAGE", mode.as_str());
        }

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;

        // Feed stdin from a separate thread so a child that streams output
        // before draining its input cannot deadlock us.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_string();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });
        let output = child.wait_with_output().map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ToolchainError::ExitStatus {
                tool: self.tool.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // The child succeeded without reading all of its input
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!(tool = %self.tool, "Toolchain closed stdin early");
                }
                Ok(Err(e)) => return Err(self.spawn_error(e)),
                Err(_) => {
                    return Err(ToolchainError::rejected(
                        self.tool.clone(),
                        "stdin writer panicked",
                    ))
                }
            }
        }

        String::from_utf8(output.stdout)
            .map_err(|e| ToolchainError::rejected(self.tool.clone(), e.to_string()))
    }

    fn spawn_error(&self, error: std::io::Error) -> ToolchainError {
        ToolchainError::Spawn {
            tool: self.tool.clone(),
            message: error.to_string(),
        }
    }
}

impl Formatter for CommandToolchain {
    fn format(&self, source: &str, mode: LanguageMode) -> ToolchainResult<String> {
        self.run(source, Some(mode))
    }
}

impl Transpiler for CommandToolchain {
    fn transform(&self, source: &str) -> ToolchainResult<Transpiled> {
        self.run(source, Some(LanguageMode::Script)).map(Transpiled::ok)
    }
}

impl StyleCompiler for CommandToolchain {
    fn compile(&self, source: &str) -> ToolchainResult<String> {
        self.run(source, Some(LanguageMode::Style))
    }
}

impl ComponentRenderer for CommandToolchain {
    fn render(&self, component: &str) -> ToolchainResult<String> {
        self.run(component, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_formatter() {
        let out = IdentityFormatter
            .format("{% if x %}a{% endif %}", LanguageMode::Liquid)
            .unwrap();
        assert_eq!(out, "{% if x %}a{% endif %}");
    }

    #[test]
    fn test_unconfigured_renderer_fails() {
        let err = UnconfiguredRenderer.render("function App() {}").unwrap_err();
        assert_eq!(err, ToolchainError::not_configured("renderer"));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let tool = CommandToolchain::new(
            "style compiler",
            CommandSpec {
                program: "liquify-definitely-not-a-real-program".to_string(),
                args: vec![],
            },
        );
        let err = tool.compile("a { b: c }").unwrap_err();
        assert!(matches!(err, ToolchainError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_child_ignoring_stdin_still_succeeds() {
        let tool = CommandToolchain::new(
            "renderer",
            CommandSpec {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "printf '<p>static</p>'".to_string()],
            },
        );
        let input = "x".repeat(1 << 20);
        assert_eq!(tool.render(&input).unwrap(), "<p>static</p>");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_reported() {
        let tool = CommandToolchain::new(
            "formatter",
            CommandSpec {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "echo bad >&2; exit 3".to_string()],
            },
        );
        let err = tool.format("a", LanguageMode::Liquid).unwrap_err();
        assert!(matches!(err, ToolchainError::ExitStatus { status: 3, .. }));
    }

    #[test]
    fn test_command_spec_deserializes_without_args() {
        let spec: CommandSpec = serde_json::from_str(r#"{ "program": "sass" }"#).unwrap();
        assert_eq!(spec.program, "sass");
        assert!(spec.args.is_empty());
    }
}
