use std::collections::HashSet;
use std::time::Duration;

use lwquery_core::error::{LwQueryError, Result};
use serde::Deserialize;

use crate::transport::QueryOptions;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub query: QuerySection,

    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LwQueryError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.query.validate()?;

        let mut names = HashSet::new();
        for s in &self.servers {
            if s.name.trim().is_empty() {
                return Err(LwQueryError::Config("servers[].name must not be empty".into()));
            }
            if s.address.trim().is_empty() {
                return Err(LwQueryError::Config(format!(
                    "servers[{}].address must not be empty",
                    s.name
                )));
            }
            if !names.insert(s.name.as_str()) {
                return Err(LwQueryError::Config(format!(
                    "duplicate server name {}",
                    s.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            query: QuerySection::default(),
            servers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuerySection {
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_recv_timeout_ms")]
    pub recv_timeout_ms: u64,

    #[serde(default = "default_match_cookie")]
    pub match_cookie: bool,
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            recv_timeout_ms: default_recv_timeout_ms(),
            match_cookie: default_match_cookie(),
        }
    }
}

impl QuerySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=20).contains(&self.max_retries) {
            return Err(LwQueryError::Config(
                "query.max_retries must be between 1 and 20".into(),
            ));
        }
        if self.retry_delay_ms > 60_000 {
            return Err(LwQueryError::Config(
                "query.retry_delay_ms must be at most 60000".into(),
            ));
        }
        if !(100..=30_000).contains(&self.recv_timeout_ms) {
            return Err(LwQueryError::Config(
                "query.recv_timeout_ms must be between 100 and 30000".into(),
            ));
        }
        Ok(())
    }

    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            recv_timeout: Duration::from_millis(self.recv_timeout_ms),
            match_cookie: self.match_cookie,
        }
    }
}

fn default_max_retries() -> usize {
    3
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_recv_timeout_ms() -> u64 {
    2000
}
fn default_match_cookie() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerEntry {
    pub name: String,
    /// "host:port"
    pub address: String,
}
