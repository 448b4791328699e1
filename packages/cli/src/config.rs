use quillpad_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "quillpad.config.json";

/// Quillpad configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// History depth, notice duration and clear-formatting policy
    #[serde(flatten)]
    pub editor: EditorConfig,

    /// Save the bundle at most this often while replaying a script;
    /// unset saves only at the end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave_interval_secs: Option<u64>,

    /// Where the local snapshot bundle lives, relative to the project
    #[serde(default = "default_bundle_path")]
    pub bundle_path: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub dark_theme: bool,
}

fn default_bundle_path() -> String {
    ".quillpad/bundle.json".to_string()
}

fn default_title() -> String {
    "Untitled".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the snapshot bundle
    pub fn get_bundle_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.bundle_path)
    }

    /// Editor-side subset
    pub fn editor(&self) -> EditorConfig {
        self.editor.clone()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            autosave_interval_secs: None,
            bundle_path: default_bundle_path(),
            title: default_title(),
            author: String::new(),
            dark_theme: false,
        }
    }
}
