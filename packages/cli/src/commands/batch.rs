use crate::config::{Config, Toolset};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use liquify_section::{compile_section, compile_snippet, Document, Notes, Toolchains};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Directory of templates (overrides config)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory to write compiled templates to (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Section,
    Snippet,
}

impl TemplateKind {
    fn plural(&self) -> &'static str {
        match self {
            TemplateKind::Section => "sections",
            TemplateKind::Snippet => "snippets",
        }
    }

    /// Component modules saved as `*.jsx.liquid` are not snippets
    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        match self {
            TemplateKind::Section => name.ends_with(".liquid"),
            TemplateKind::Snippet => name.ends_with(".liquid") && !name.ends_with(".jsx.liquid"),
        }
    }
}

/// Per-run tallies
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub compiled: usize,
    pub failed: usize,
    pub warnings: usize,
}

pub fn sections(args: BatchArgs, cwd: &Path) -> Result<()> {
    run(TemplateKind::Section, args, cwd).map(|_| ())
}

pub fn snippets(args: BatchArgs, cwd: &Path) -> Result<()> {
    run(TemplateKind::Snippet, args, cwd).map(|_| ())
}

/// Compile every template of `kind` under the input directory. Fails once
/// all files were attempted if any of them failed.
pub fn run(kind: TemplateKind, args: BatchArgs, cwd: &Path) -> Result<Summary> {
    let config = Config::load(cwd)?;
    let input_dir = match args.input {
        Some(input) => cwd.join(input),
        None => match kind {
            TemplateKind::Section => config.sections_dir(cwd),
            TemplateKind::Snippet => config.snippets_dir(cwd),
        },
    };
    let output_dir = match args.output {
        Some(output) => cwd.join(output),
        None => config.out_dir(cwd).join(kind.plural()),
    };

    if !input_dir.is_dir() {
        return Err(anyhow!("Input directory does not exist: {}", input_dir.display()));
    }

    println!(
        "{}",
        format!("Compiling {}...", kind.plural()).bright_blue().bold()
    );

    let templates = find_templates(&input_dir, kind);
    if templates.is_empty() {
        println!("{}", format!("No {} found", kind.plural()).yellow());
        return Ok(Summary::default());
    }

    debug!(
        input = %input_dir.display(),
        output = %output_dir.display(),
        count = templates.len(),
        "Found templates"
    );

    let toolset = Toolset::from_config(&config);
    let toolchains = toolset.toolchains();
    let mut summary = Summary::default();

    for template in &templates {
        let relative_path = template.strip_prefix(&input_dir).unwrap_or(template);
        let output_path = output_dir.join(relative_path);

        match compile_file(kind, template, &output_path, &toolchains) {
            Ok(notes) => {
                summary.compiled += 1;
                println!(
                    "  {} {} → {}",
                    "✓".green(),
                    relative_path.display(),
                    output_path.display()
                );
                summary.warnings += report_notes(&notes);
            }
            Err(e) => {
                summary.failed += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }
    }

    println!();
    if summary.warnings > 0 {
        println!("{} {} warning(s)", "⚠".yellow(), summary.warnings);
    }
    if summary.failed == 0 {
        println!(
            "{} Compiled {} {} successfully",
            "✓".green(),
            summary.compiled,
            kind.plural()
        );
        Ok(summary)
    } else {
        Err(anyhow!(
            "Compiled {} {}, {} failed",
            summary.compiled,
            kind.plural(),
            summary.failed
        ))
    }
}

/// Template files under `dir`, in a stable order
pub fn find_templates(dir: &Path, kind: TemplateKind) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && kind.accepts(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn compile_file(
    kind: TemplateKind,
    input: &Path,
    output: &Path,
    toolchains: &Toolchains,
) -> Result<Notes> {
    let source = fs::read_to_string(input)?;
    let document = Document::new(input, source);

    let compiled = match kind {
        TemplateKind::Section => compile_section(&document, toolchains)?,
        TemplateKind::Snippet => compile_snippet(&document, toolchains)?,
    };

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, compiled.output)?;

    Ok(compiled.notes)
}

/// Print recoverable findings under the file they belong to; returns how
/// many were printed
pub fn report_notes(notes: &Notes) -> usize {
    for miss in &notes.misses {
        println!(
            "      {} placeholder {} for {:?} `{}` was lost",
            "warning:".yellow(),
            miss.token,
            miss.kind,
            miss.source
        );
    }
    for warning in &notes.import_warnings {
        println!("      {} {}", "warning:".yellow(), warning);
    }
    notes.misses.len() + notes.import_warnings.len()
}
