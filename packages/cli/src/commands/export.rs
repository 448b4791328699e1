use crate::commands::run::{print_document, ConsoleNotifier};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use quillpad_common::{FileSnapshotStore, SnapshotStore};
use quillpad_editor::EditSession;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Bundle to export (defaults to the configured bundle path)
    pub bundle: Option<String>,

    /// Output format (html, text)
    #[arg(short, long, default_value = "html")]
    pub format: String,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<String>,
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let bundle_path = match &args.bundle {
        Some(path) => PathBuf::from(cwd).join(path),
        None => config.get_bundle_path(cwd),
    };

    let store = FileSnapshotStore::new(&bundle_path);
    let bundle = store
        .load()?
        .ok_or_else(|| anyhow!("No snapshot bundle at {}", bundle_path.display()))?;
    let session = EditSession::from_bundle(&config.title, &bundle, config.editor(), ConsoleNotifier::default())?;

    let Some(out) = args.out else {
        return print_document(&session, &args.format);
    };

    let rendered = match args.format.as_str() {
        "html" => wrap_html(&bundle.title, &session.to_html(), bundle.dark_theme),
        "text" => session.to_plain_text(),
        other => return Err(anyhow!("Invalid format: {}. Use: html or text", other)),
    };
    let out_path = PathBuf::from(cwd).join(&out);
    fs::write(&out_path, rendered)?;
    println!("  {} {} → {}", "✓".green(), bundle.title, out_path.display());
    Ok(())
}

/// Standalone page around the document markup
fn wrap_html(title: &str, body: &str, dark_theme: bool) -> String {
    let class = if dark_theme { " class=\"dark\"" } else { "" };
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body{}>\n{}\n</body>\n</html>\n",
        quillpad_model::escape(title),
        class,
        body
    )
}
