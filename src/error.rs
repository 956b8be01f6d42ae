/// Error types for the I/O edges: terminal, config file, save file.
///
/// Gameplay itself never fails; wrong answers and timeouts are game events.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("terminal I/O failed")]
    Terminal(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("could not write best score to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
