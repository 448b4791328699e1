use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Document title stored with the snapshot bundle
    #[arg(short, long, default_value = "Untitled")]
    pub title: String,

    /// Author stored with the snapshot bundle
    #[arg(short, long, default_value = "")]
    pub author: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

const EXAMPLE_SCRIPT: &str = r#"[
  { "type": "insertText", "text": "Meeting notes" },
  { "type": "format", "command": { "kind": "block", "block": "heading1" } },
  { "type": "enter" },
  { "type": "insertText", "text": "Agenda and action items." },
  { "type": "enter" },
  { "type": "insertTable", "rows": "2", "columns": "3" }
]
"#;

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Quillpad document...".bright_blue().bold());

    // Create example script if it doesn't exist
    let example_file = PathBuf::from(cwd).join("example.script.json");
    if !example_file.exists() {
        fs::write(&example_file, EXAMPLE_SCRIPT)?;
        println!("  {} Created example.script.json", "✓".green());
    }

    let config = Config {
        title: args.title,
        author: args.author,
        ..Config::default()
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Document initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit example.script.json");
    println!("  2. Run: quillpad run example.script.json");
    println!("  3. Run: quillpad export --format html");

    Ok(())
}
