//! Configuration loading and parsing.
//!
//! Parses `textarea.toml` (or an override path provided by the binary) into
//! the `[area]`, `[style]` and `[keys]` tables. Every field is optional; a
//! missing file or a file that fails to parse yields the defaults. Unknown
//! fields are ignored so older binaries tolerate newer files.
//!
//! Key chords (`"ctrl+enter"`, `"alt+enter"`, `"ctrl+d"`) and colour names are
//! kept as strings in the file model and resolved on demand; an unresolvable
//! value logs a warning and falls back to the default.

pub mod chord;

pub use chord::{KeyChord, KeyChordParseError};

use anyhow::Result;
use crossterm::style::Color;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "textarea.toml";
pub const DEFAULT_SUBMIT: &str = "ctrl+enter";
pub const DEFAULT_NEWLINE: &str = "enter";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AreaConfig {
    /// Minimum visible rows.
    pub rows: Option<usize>,
    /// Maximum visible rows.
    pub max_rows: Option<usize>,
    pub tab_size: usize,
    pub mask: Option<String>,
    pub placeholder: Option<String>,
    pub focus: bool,
    pub show_cursor: bool,
    pub highlight_pasted_text: bool,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            rows: None,
            max_rows: None,
            tab_size: 4,
            mask: None,
            placeholder: None,
            focus: true,
            show_cursor: true,
            highlight_pasted_text: false,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StyleConfig {
    pub text: Option<String>,
    pub highlight: Option<String>,
    pub highlight_background: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct KeysConfig {
    pub submit: String,
    pub newline: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            submit: DEFAULT_SUBMIT.to_string(),
            newline: DEFAULT_NEWLINE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub area: AreaConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub keys: KeysConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Config path following platform conventions (XDG / AppData Roaming),
/// preferring `textarea.toml` in the working directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("textarea").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    let mut cfg = match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Config {
            raw: Some(content),
            path: Some(path),
            file,
        },
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            return Ok(Config::default());
        }
    };
    cfg.clamp_tab_size();
    Ok(cfg)
}

impl Config {
    fn clamp_tab_size(&mut self) {
        if self.file.area.tab_size == 0 {
            info!(target: "config", raw = 0, clamped = 1, "tab_size_clamped");
            self.file.area.tab_size = 1;
        }
    }

    pub fn submit_chord(&self) -> KeyChord {
        resolve_chord("submit", &self.file.keys.submit, DEFAULT_SUBMIT)
    }

    pub fn newline_chord(&self) -> KeyChord {
        resolve_chord("newline", &self.file.keys.newline, DEFAULT_NEWLINE)
    }

    pub fn text_color(&self) -> Option<Color> {
        resolve_color("text", self.file.style.text.as_deref())
    }

    pub fn highlight_color(&self) -> Option<Color> {
        resolve_color("highlight", self.file.style.highlight.as_deref())
    }

    pub fn highlight_background(&self) -> Option<Color> {
        resolve_color(
            "highlight_background",
            self.file.style.highlight_background.as_deref(),
        )
    }
}

fn resolve_chord(binding: &'static str, raw: &str, fallback: &str) -> KeyChord {
    match raw.parse::<KeyChord>() {
        Ok(chord) => chord,
        Err(e) => {
            warn!(target: "config", binding, error = %e, "key_chord_invalid_using_default");
            fallback.parse().unwrap_or_default()
        }
    }
}

fn resolve_color(field: &'static str, raw: Option<&str>) -> Option<Color> {
    let raw = raw?;
    let color = parse_color(raw);
    if color.is_none() {
        warn!(target: "config", field, value = raw, "unknown_color_ignored");
    }
    color
}

/// Parse a crossterm colour name, also accepting `darkgrey`, `dark-grey`,
/// `gray` and mixed case.
pub fn parse_color(name: &str) -> Option<Color> {
    let mut name = name
        .trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
        .replace("gray", "grey");
    if let Some(rest) = name.strip_prefix("dark") {
        if !rest.starts_with('_') {
            name = format!("dark_{rest}");
        }
    }
    Color::try_from(name.as_str()).ok()
}
