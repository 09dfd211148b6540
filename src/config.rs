use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub colors: ColorsConfig,
    pub keybinds: KeybindsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Redraw cadence. Refresh cadence is counted in these ticks.
    pub tick_rate_ms: u64,
    pub refresh_period_ticks: u64,
    pub fetch_timeout_ms: u64,
    pub sparkline_length: usize,
    pub color_support: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            tick_rate_ms: 50,
            refresh_period_ticks: 20,
            fetch_timeout_ms: 3000,
            sparkline_length: 60,
            color_support: "auto".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub theme: String,
    pub severity_low: String,
    pub severity_medium: String,
    pub severity_high: String,
    pub severity_overloaded: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            theme: "dark".to_string(),
            severity_low: "#10b981".to_string(),
            severity_medium: "#eab308".to_string(),
            severity_high: "#ef4444".to_string(),
            severity_overloaded: "#ec4899".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub filter: String,
    pub refresh: String,
    pub cycle_theme: String,
    pub help: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            filter: "/".to_string(),
            refresh: "r".to_string(),
            cycle_theme: "t".to_string(),
            help: "?".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// No file means no logging; the terminal belongs to the dashboard.
    pub file: Option<PathBuf>,
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: None,
            level: "info".to_string(),
            json: false,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dtop").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

/// Parses a keybind name such as `q`, `Enter`, `Esc` or `F5`.
pub fn parse_key(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        other => other
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=12).contains(n))
            .map(KeyCode::F),
    }
}
