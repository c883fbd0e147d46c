mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{module, sections, snippets, BatchArgs, ModuleArgs};
use tracing_subscriber::EnvFilter;

/// Liquify CLI - compile Liquid theme sections with embedded components
#[derive(Parser, Debug)]
#[command(name = "liquify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log pipeline progress at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile every section template in a directory
    Sections(BatchArgs),

    /// Compile every snippet template in a directory
    Snippets(BatchArgs),

    /// Compile one component module into a section
    Module(ModuleArgs),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("{} cannot read current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Sections(args) => sections(args, &cwd),
        Command::Snippets(args) => snippets(args, &cwd),
        Command::Module(args) => module(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
