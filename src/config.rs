//! Data file location.
//!
//! Resolution order:
//! - `--file <PATH>` on the command line
//! - `TI_NOTES_FILE` environment variable
//! - `~/.ti_notes.json`

use std::path::PathBuf;

use anyhow::Result;

pub const DATA_FILE_ENV: &str = "TI_NOTES_FILE";
pub const DEFAULT_FILE_NAME: &str = ".ti_notes.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_file: PathBuf,
}

impl Config {
    /// Resolve the data file, preferring an explicit path over the environment.
    pub fn resolve(file_override: Option<PathBuf>) -> Result<Self> {
        resolve_with(
            file_override,
            std::env::var(DATA_FILE_ENV).ok(),
            dirs::home_dir(),
        )
    }
}

fn resolve_with(
    file_override: Option<PathBuf>,
    env_file: Option<String>,
    home: Option<PathBuf>,
) -> Result<Config> {
    if let Some(data_file) = file_override {
        return Ok(Config { data_file });
    }
    if let Some(env_file) = env_file.filter(|value| !value.trim().is_empty()) {
        return Ok(Config {
            data_file: PathBuf::from(env_file),
        });
    }

    let home = home.ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(Config {
        data_file: home.join(DEFAULT_FILE_NAME),
    })
}
