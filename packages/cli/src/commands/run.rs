use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use quillpad_common::{FileSnapshotStore, SnapshotStore};
use quillpad_editor::{EditSession, ErrorKind, Intent, Notice, Notifier, Outcome};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Script of intents (JSON array)
    pub script: String,

    /// Output format printed at the end (html, text, none)
    #[arg(short, long, default_value = "html")]
    pub format: String,

    /// Continue from the saved snapshot bundle instead of a blank document
    #[arg(long)]
    pub resume: bool,

    /// Do not write the snapshot bundle
    #[arg(long)]
    pub no_save: bool,

    /// Stop at the first rejected step
    #[arg(long)]
    pub strict: bool,
}

/// One scripted step: an intent, or an image file read from disk
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Step {
    ImageFile {
        #[serde(rename = "imageFile")]
        path: PathBuf,
    },
    Intent(Intent),
}

/// Prints notices to stderr as they arrive
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    pub rejected: usize,
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            None => eprintln!("  {} {}", "ℹ".blue(), notice.message),
            Some(ErrorKind::NoOp) => eprintln!("  {} {}", "·".dimmed(), notice.message.dimmed()),
            Some(ErrorKind::Validation) => eprintln!("  {} {}", "⚠️".yellow(), notice.message.yellow()),
            Some(ErrorKind::External) => eprintln!("  {} {}", "✗".red(), notice.message.red()),
        }
        if notice.kind.is_some() {
            self.rejected += 1;
        }
    }
}

pub fn run(args: RunArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let script_path = PathBuf::from(cwd).join(&args.script);
    let steps = load_script(&script_path)?;
    let base_dir = script_path.parent().unwrap_or_else(|| Path::new(cwd)).to_path_buf();

    let mut store = FileSnapshotStore::new(config.get_bundle_path(cwd));
    let mut session = open_session(&config, &store, args.resume)?;

    println!(
        "{} {} ({} steps)",
        "▶".bright_blue(),
        args.script.bright_white(),
        steps.len()
    );

    let autosave = config.autosave_interval_secs.map(Duration::from_secs);
    let mut last_save = Instant::now();

    for (index, step) in steps.into_iter().enumerate() {
        let intent = resolve_step(step, &base_dir)?;
        let name = intent.name();
        let outcome = session.dispatch(intent);
        debug!(step = index + 1, intent = name, ?outcome, "Replayed step");

        if args.strict {
            if let Outcome::Rejected { message, .. } = &outcome {
                return Err(anyhow!("Step {} ({}) rejected: {}", index + 1, name, message));
            }
        }

        if !args.no_save {
            if let Some(interval) = autosave {
                if outcome.is_committed() && last_save.elapsed() >= interval {
                    save(&session, &config, &mut store)?;
                    last_save = Instant::now();
                }
            }
        }
    }

    if !args.no_save {
        save(&session, &config, &mut store)?;
    }

    let rejected = session.notifier().rejected;
    if rejected > 0 {
        println!("{} {} step(s) rejected", "⚠️".yellow(), rejected);
    }

    print_document(&session, &args.format)?;
    Ok(())
}

fn open_session(
    config: &Config,
    store: &FileSnapshotStore,
    resume: bool,
) -> Result<EditSession<ConsoleNotifier>> {
    if resume {
        if let Some(bundle) = store.load()? {
            info!(path = %store.path().display(), "Resuming from snapshot bundle");
            return Ok(EditSession::from_bundle(
                &config.title,
                &bundle,
                config.editor(),
                ConsoleNotifier::default(),
            )?);
        }
    }
    Ok(EditSession::new(&config.title, config.editor(), ConsoleNotifier::default()))
}

pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read script {}", path.display()))?;
    let steps = serde_json::from_str(&content)
        .with_context(|| format!("Invalid script {}", path.display()))?;
    Ok(steps)
}

fn resolve_step(step: Step, base_dir: &Path) -> Result<Intent> {
    match step {
        Step::Intent(intent) => Ok(intent),
        Step::ImageFile { path } => {
            let full = base_dir.join(&path);
            let bytes =
                fs::read(&full).with_context(|| format!("Cannot read image {}", full.display()))?;
            Ok(Intent::InsertImage { bytes })
        }
    }
}

fn save<N: Notifier>(session: &EditSession<N>, config: &Config, store: &mut FileSnapshotStore) -> Result<()> {
    let bundle = session.to_bundle(&config.title, &config.author, config.dark_theme)?;
    store.save(&bundle)?;
    println!("  {} Saved {}", "✓".green(), store.path().display());
    Ok(())
}

pub fn print_document<N: Notifier>(session: &EditSession<N>, format: &str) -> Result<()> {
    match format {
        "html" => println!("{}", session.to_html()),
        "text" => println!("{}", session.to_plain_text()),
        "none" => {}
        other => {
            return Err(anyhow!("Invalid format: {}. Use: html, text, or none", other));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_parse_intents_and_image_files() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[{"type": "enter"}, {"imageFile": "logo.png"}, {"type": "undo"}]"#,
        )
        .unwrap();

        assert!(matches!(steps[0], Step::Intent(Intent::Enter)));
        assert!(matches!(&steps[1], Step::ImageFile { path } if path == Path::new("logo.png")));
        assert!(matches!(steps[2], Step::Intent(Intent::Undo)));
    }

    #[test]
    fn test_run_saves_bundle_and_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        fs::write(
            dir.path().join("one.json"),
            r#"[{"type": "insertText", "text": "hello"}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("two.json"),
            r#"[{"type": "insertText", "text": " world"}]"#,
        )
        .unwrap();

        let args = |script: &str, resume| RunArgs {
            script: script.into(),
            format: "none".into(),
            resume,
            no_save: false,
            strict: true,
        };
        run(args("one.json", false), &cwd).unwrap();
        run(args("two.json", true), &cwd).unwrap();

        let store = FileSnapshotStore::new(Config::default().get_bundle_path(&cwd));
        let bundle = store.load().unwrap().unwrap();
        let session = EditSession::from_bundle(
            "check",
            &bundle,
            Config::default().editor(),
            ConsoleNotifier::default(),
        )
        .unwrap();
        assert_eq!(session.to_plain_text(), "hello world");
    }

    #[test]
    fn test_strict_run_stops_on_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        fs::write(
            dir.path().join("bad.json"),
            r#"[{"type": "insertTable", "rows": "x", "columns": "1"}]"#,
        )
        .unwrap();

        let result = run(
            RunArgs {
                script: "bad.json".into(),
                format: "none".into(),
                resume: false,
                no_save: true,
                strict: true,
            },
            &cwd,
        );
        assert!(result.is_err());
    }
}
