use super::batch::report_notes;
use crate::config::{Config, Toolset};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use liquify_bridge::PipelineAdapter;
use liquify_script::format_errors;
use liquify_section::{compile_module, Document, SectionError};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ModuleArgs {
    /// Component module exporting `default`, `style` and `schema`
    pub file: PathBuf,

    /// Output file (defaults to `<outDir>/sections/<name>.liquid`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn module(args: ModuleArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = cwd.join(&args.file);
    let output = match args.output {
        Some(output) => cwd.join(output),
        None => config
            .out_dir(cwd)
            .join("sections")
            .join(section_file_name(&input)?),
    };

    let source = fs::read_to_string(&input)
        .map_err(|e| anyhow!("Cannot read {}: {}", input.display(), e))?;
    let document = Document::new(&input, source);

    let toolset = Toolset::from_config(&config);
    let compiled = compile_module(&document, &toolset.toolchains())
        .map_err(|e| describe(e, &document, &config.salt))?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, compiled.output)?;

    println!(
        "  {} {} → {}",
        "✓".green(),
        args.file.display(),
        output.display()
    );
    report_notes(&compiled.notes);

    Ok(())
}

/// `hero.section.jsx` becomes `hero.liquid`
fn section_file_name(input: &Path) -> Result<String> {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Not a file: {}", input.display()))?;
    let stem = name.split('.').next().unwrap_or(name);
    Ok(format!("{}.liquid", stem))
}

/// Syntax errors are reported against the placeholder-bearing source the
/// parser saw, with the offending line underlined
fn describe(error: SectionError, document: &Document, salt: &str) -> anyhow::Error {
    let SectionError::Script(script_error) = &error else {
        return error.into();
    };

    let Ok(tokenized) = PipelineAdapter::component(salt).tokenize(document.source()) else {
        return error.into();
    };
    let in_bounds = script_error
        .span()
        .map_or(true, |span| span.end <= tokenized.source().len());
    if !in_bounds {
        return error.into();
    }

    let filename = document.path().display().to_string();
    anyhow!(
        "\n{}",
        format_errors(tokenized.source(), &filename, std::slice::from_ref(script_error))
    )
}
