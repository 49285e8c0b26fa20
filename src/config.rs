//! Runtime configuration.
//!
//! Values are resolved with the following priority:
//! 1. Command-line flags
//! 2. Environment variables (`TODOS_DATA_DIR`, `TODOS_LOG_FILE`)
//! 3. Defaults under the platform data directory

use std::path::PathBuf;

use clap::Parser;

use crate::todo_store::DEFAULT_SLOT;

pub const DATA_DIR_ENV: &str = "TODOS_DATA_DIR";
pub const LOG_FILE_ENV: &str = "TODOS_LOG_FILE";

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "todos", version, about = "Terminal todo list")]
pub struct Cli {
    /// Directory holding the todo list file
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// File that diagnostics are appended to
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Name of the storage slot
    #[arg(long, default_value = DEFAULT_SLOT)]
    pub slot: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub slot: String,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        Self::resolve(cli, |name| std::env::var(name).ok())
    }

    /// Resolves against an arbitrary environment lookup.
    pub fn resolve(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = cli
            .data_dir
            .or_else(|| env(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        let log_file = cli
            .log_file
            .or_else(|| env(LOG_FILE_ENV).map(PathBuf::from))
            .unwrap_or_else(|| data_dir.join("todos.log"));
        let slot = if cli.slot.is_empty() {
            DEFAULT_SLOT.to_string()
        } else {
            cli.slot
        };

        Self {
            data_dir,
            log_file,
            slot,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("todos"))
        .unwrap_or_else(|| PathBuf::from(".todos"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_flags_win_over_env() {
        let cli = Cli::parse_from(["todos", "--data-dir", "/tmp/flag"]);
        let config = Config::resolve(cli, |_| Some("/tmp/env".to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/flag"));
        assert_eq!(config.log_file, PathBuf::from("/tmp/env"));
        assert_eq!(config.slot, "todos");
    }

    #[test]
    fn test_env_then_defaults() {
        let cli = Cli::parse_from(["todos", "--slot", "work"]);
        let config = Config::resolve(cli, |name| {
            (name == DATA_DIR_ENV).then(|| "/tmp/env".to_string())
        });
        assert_eq!(config.data_dir, PathBuf::from("/tmp/env"));
        assert_eq!(config.log_file, PathBuf::from("/tmp/env/todos.log"));
        assert_eq!(config.slot, "work");

        let config = Config::resolve(Cli::parse_from(["todos"]), no_env);
        assert_eq!(config.log_file, config.data_dir.join("todos.log"));
        assert_eq!(config.slot, DEFAULT_SLOT);
    }
}
