//! # Config - service settings from the environment
//!
//! Every setting has a default and can be overridden by one environment
//! variable:
//!
//! ```text
//! TODO_DBPATH          engine directory              (default: "todo.db")
//! TODO_BIND            listen address                (default: "0.0.0.0:8000")
//! TODO_MAXITEMS        max number of items           (default: 100)
//! TODO_MAXTITLELENGTH  max title length, characters  (default: 100)
//! TODO_THEME           color theme name              (default: "dracula")
//! TODO_SYNC            fsync every append            (default: "true")
//! TODO_MERGE_KB        auto-merge trigger in KiB     (default: 1024, 0 = disabled)
//! ```
//!
//! Unlike a silent fallback, a value that is set but cannot be parsed is an
//! error naming the variable.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_DBPATH: &str = "TODO_DBPATH";
pub const ENV_BIND: &str = "TODO_BIND";
pub const ENV_MAXITEMS: &str = "TODO_MAXITEMS";
pub const ENV_MAXTITLELENGTH: &str = "TODO_MAXTITLELENGTH";
pub const ENV_THEME: &str = "TODO_THEME";
pub const ENV_SYNC: &str = "TODO_SYNC";
pub const ENV_MERGE_KB: &str = "TODO_MERGE_KB";

pub const DEFAULT_DBPATH: &str = "todo.db";
pub const DEFAULT_BIND: ([u8; 4], u16) = ([0, 0, 0, 0], 8000);
pub const DEFAULT_MAX_ITEMS: usize = 100;
pub const DEFAULT_MAX_TITLE_LENGTH: usize = 100;
pub const DEFAULT_THEME: &str = "dracula";
pub const DEFAULT_SYNC: bool = true;
pub const DEFAULT_MERGE_KB: u64 = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

/// Resolved service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    pub max_items: usize,
    pub max_title_length: usize,
    pub theme: String,
    pub sync: bool,
    /// Dead bytes that trigger an automatic merge; 0 disables it.
    pub merge_trigger_bytes: u64,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. `lookup` returns
    /// `None` for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_items: usize = var(&lookup, ENV_MAXITEMS, DEFAULT_MAX_ITEMS)?;
        let max_title_length: usize =
            var(&lookup, ENV_MAXTITLELENGTH, DEFAULT_MAX_TITLE_LENGTH)?;
        if max_items == 0 {
            return Err(ConfigError::Zero { var: ENV_MAXITEMS });
        }
        if max_title_length == 0 {
            return Err(ConfigError::Zero {
                var: ENV_MAXTITLELENGTH,
            });
        }

        let defaults = Config::default();
        let merge_kb: u64 = var(&lookup, ENV_MERGE_KB, DEFAULT_MERGE_KB)?;

        Ok(Self {
            db_path: lookup(ENV_DBPATH).map_or(defaults.db_path, PathBuf::from),
            bind: var(&lookup, ENV_BIND, defaults.bind)?,
            max_items,
            max_title_length,
            theme: lookup(ENV_THEME).unwrap_or(defaults.theme),
            sync: var(&lookup, ENV_SYNC, defaults.sync)?,
            merge_trigger_bytes: merge_kb.saturating_mul(1024),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DBPATH),
            bind: SocketAddr::from(DEFAULT_BIND),
            max_items: DEFAULT_MAX_ITEMS,
            max_title_length: DEFAULT_MAX_TITLE_LENGTH,
            theme: DEFAULT_THEME.to_string(),
            sync: DEFAULT_SYNC,
            merge_trigger_bytes: DEFAULT_MERGE_KB * 1024,
        }
    }
}

/// Parses `var` if it is set, otherwise returns `default`.
fn var<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => parse_var(name, &value),
        None => Ok(default),
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
