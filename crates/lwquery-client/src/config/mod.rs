//! Client config loader (strict parsing).
//!
//! The file is optional: without `--config` or `LWQUERY_CONFIG`, built-in
//! query defaults apply and targets must come from the command line.

pub mod schema;

use std::fs;

use lwquery_core::error::{LwQueryError, Result};

pub use schema::{ClientConfig, QuerySection, ServerEntry};

/// Environment variable naming a config file when no flag is given.
pub const CONFIG_ENV: &str = "LWQUERY_CONFIG";

/// Pick the config path: the flag wins over the environment; blanks are ignored.
pub fn config_path(flag: Option<&str>, env: Option<String>) -> Option<String> {
    flag.filter(|p| !p.trim().is_empty())
        .map(str::to_string)
        .or_else(|| env.filter(|p| !p.trim().is_empty()))
}

/// Load the config named by `flag` or `LWQUERY_CONFIG`, else defaults.
pub fn load(flag: Option<&str>) -> Result<ClientConfig> {
    match config_path(flag, std::env::var(CONFIG_ENV).ok()) {
        Some(path) => {
            tracing::debug!(%path, "loading config");
            load_from_file(&path)
        }
        None => Ok(ClientConfig::default()),
    }
}

pub fn load_from_file(path: &str) -> Result<ClientConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LwQueryError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s).map_err(|e| match e {
        LwQueryError::Config(msg) => LwQueryError::Config(format!("{path}: {msg}")),
        other => other,
    })
}

pub fn load_from_str(s: &str) -> Result<ClientConfig> {
    let cfg: ClientConfig = serde_yaml::from_str(s)
        .map_err(|e| LwQueryError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
