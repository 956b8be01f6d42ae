/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or the
/// per-user data directory. Falls back to defaults if the file is missing,
/// unreadable or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::clock::Millis;
use crate::domain::round::DEFAULT_TIME_LIMIT_MS;
use crate::domain::scoring::DEFAULT_BONUS_SECONDS;
use crate::error::ConfigError;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub round: RoundConfig,
    pub gamepad: GamepadConfig,
    pub seed: Option<u64>,
    pub frame_sleep_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundConfig {
    pub time_limit_ms: Millis,
    pub round_delay_ms: Millis,
    pub notice_ms: Millis,
    pub bonus_seconds: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub confirm: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        RoundConfig {
            time_limit_ms: default_time_limit(),
            round_delay_ms: default_round_delay(),
            notice_ms: default_notice(),
            bonus_seconds: default_bonus_seconds(),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    round: TomlRound,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlRound {
    #[serde(default = "default_time_limit")]
    time_limit_ms: Millis,
    #[serde(default = "default_round_delay")]
    round_delay_ms: Millis,
    #[serde(default = "default_notice")]
    notice_ms: Millis,
    #[serde(default = "default_bonus_seconds")]
    bonus_seconds: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_left")]
    left: Vec<String>,
    #[serde(default = "default_pad_right")]
    right: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_frame_sleep")]
    frame_sleep_ms: u64,
}

// ── Defaults ──

fn default_time_limit() -> Millis { DEFAULT_TIME_LIMIT_MS }
fn default_round_delay() -> Millis { 2000 }
fn default_notice() -> Millis { 1500 }
fn default_bonus_seconds() -> u32 { DEFAULT_BONUS_SECONDS }
fn default_frame_sleep() -> u64 { 5 }

fn default_pad_left() -> Vec<String> { vec!["L1".into()] }
fn default_pad_right() -> Vec<String> { vec!["R1".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlRound {
    fn default() -> Self {
        TomlRound {
            time_limit_ms: default_time_limit(),
            round_delay_ms: default_round_delay(),
            notice_ms: default_notice(),
            bonus_seconds: default_bonus_seconds(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            left: default_pad_left(),
            right: default_pad_right(),
            confirm: default_pad_confirm(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            frame_sleep_ms: default_frame_sleep(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = match find_config(&candidate_dirs()) {
            Some(path) => match read_config(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "loaded config");
                    cfg
                }
                Err(e) => {
                    tracing::warn!(error = %e, "using default settings");
                    TomlConfig::default()
                }
            },
            None => TomlConfig::default(),
        };
        Self::from_toml(toml_cfg)
    }

    /// Parse config text directly, defaults filling any gaps.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(cfg))
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        GameConfig {
            round: RoundConfig {
                time_limit_ms: cfg.round.time_limit_ms.max(1),
                round_delay_ms: cfg.round.round_delay_ms,
                notice_ms: cfg.round.notice_ms,
                bonus_seconds: cfg.round.bonus_seconds,
            },
            gamepad: GamepadConfig {
                left: cfg.gamepad.left,
                right: cfg.gamepad.right,
                confirm: cfg.gamepad.confirm,
                quit: cfg.gamepad.quit,
            },
            seed: cfg.general.seed,
            frame_sleep_ms: cfg.general.frame_sleep_ms,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

/// Per-user data directory (~/.local/share/reefcount).
pub fn user_data_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local/share/reefcount"))
}

/// Candidate directories to search: exe dir + CWD + user data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. User data directory
    if let Some(xdg) = user_data_dir() {
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|d| d.join("config.toml"))
        .find(|p| p.exists())
}

fn read_config(path: &Path) -> Result<TomlConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str::<TomlConfig>(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg.round, RoundConfig::default());
        assert_eq!(cfg.round.time_limit_ms, 15_000);
        assert_eq!(cfg.round.round_delay_ms, 2_000);
        assert_eq!(cfg.round.notice_ms, 1_500);
        assert_eq!(cfg.round.bonus_seconds, 10);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.frame_sleep_ms, 5);
        assert_eq!(cfg.gamepad.confirm, vec!["A".to_string(), "Start".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[round]\ntime_limit_ms = 20000\n\n[general]\nseed = 42\n",
        )
        .unwrap();
        assert_eq!(cfg.round.time_limit_ms, 20_000);
        assert_eq!(cfg.round.round_delay_ms, 2_000);
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn zero_time_limit_is_raised() {
        let cfg = GameConfig::parse("[round]\ntime_limit_ms = 0\n").unwrap();
        assert_eq!(cfg.round.time_limit_ms, 1);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let err = GameConfig::parse("[round\ntime_limit_ms = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
