mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{export, init, run, ExportArgs, InitArgs, RunArgs};

/// Quillpad CLI - headless rich-text document editing
#[derive(Parser, Debug)]
#[command(name = "quillpad")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a quillpad.config.json and an example script
    Init(InitArgs),

    /// Replay a script of editing intents and save the snapshot bundle
    Run(RunArgs),

    /// Render a saved snapshot bundle as markup or plain text
    Export(ExportArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|dir| {
            let cwd = dir.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Run(args) => run(args, &cwd),
                Command::Export(args) => export(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
