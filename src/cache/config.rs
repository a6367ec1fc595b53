//! Cache connection configuration

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::Result;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_DATABASE: i64 = 0;
pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Expand environment variables in a string.
/// Supports $VAR_NAME and ${VAR_NAME} syntax; `$$` is a literal `$`.
///
/// Substituted values are copied through as-is and never expanded again.
pub fn expand_env_vars(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut rest = input;

  while let Some(pos) = rest.find('$') {
    out.push_str(&rest[..pos]);
    let after = &rest[pos + 1..];

    if let Some(tail) = after.strip_prefix('$') {
      out.push('$');
      rest = tail;
    } else if let Some(braced) = after.strip_prefix('{') {
      match braced.find('}') {
        Some(end) => {
          out.push_str(&std::env::var(&braced[..end]).unwrap_or_default());
          rest = &braced[end + 1..];
        }
        None => {
          // Unterminated, keep the text as written.
          out.push_str(&rest[pos..]);
          rest = "";
        }
      }
    } else {
      let name_len = after
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(after.len());
      if name_len == 0 {
        out.push('$');
      } else {
        out.push_str(&std::env::var(&after[..name_len]).unwrap_or_default());
      }
      rest = &after[name_len..];
    }
  }

  out.push_str(rest);
  out
}

/// Connection settings for the backing Redis server.
///
/// Zero values (empty host, port 0, and so on) stand for "use the default";
/// [`CacheConfig::resolve`] replaces them before a connection is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
  /// Redis host
  #[serde(default = "default_host")]
  pub host: String,

  /// Redis port
  #[serde(default = "default_port")]
  pub port: u16,

  /// Redis password (empty = no AUTH)
  #[serde(default)]
  pub password: String,

  /// Redis database number
  #[serde(default)]
  pub database: i64,

  /// Reconnect attempts made by the connection manager
  #[serde(default = "default_max_retries")]
  pub max_retries: usize,

  /// Number of multiplexed connections opened at startup
  #[serde(default = "default_pool_size")]
  pub pool_size: usize,
}

fn default_host() -> String {
  DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
  DEFAULT_PORT
}

fn default_max_retries() -> usize {
  DEFAULT_MAX_RETRIES
}

fn default_pool_size() -> usize {
  DEFAULT_POOL_SIZE
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      password: String::new(),
      database: DEFAULT_DATABASE,
      max_retries: default_max_retries(),
      pool_size: default_pool_size(),
    }
  }
}

impl CacheConfig {
  /// Load a YAML config file, expanding `$VAR` references first.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(&path)?;
    Self::from_yaml(&content)
  }

  pub fn from_yaml(content: &str) -> Result<Self> {
    let expanded = expand_env_vars(content);
    Ok(serde_yaml::from_str(&expanded)?)
  }

  pub fn find_and_load() -> Result<Option<Self>> {
    for p in ["rcache.yaml", "rcache.yml"] {
      if Path::new(p).exists() {
        tracing::info!("Loading config from {}", p);
        return Ok(Some(Self::from_file(p)?));
      }
    }
    Ok(None)
  }

  /// Replace zero-valued fields with their defaults.
  pub fn resolve(mut self) -> Self {
    if self.host.is_empty() {
      self.host = default_host();
    }
    if self.port == 0 {
      self.port = default_port();
    }
    if self.max_retries == 0 {
      self.max_retries = default_max_retries();
    }
    if self.pool_size == 0 {
      self.pool_size = default_pool_size();
    }
    self
  }

  pub fn address(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }

  /// Connection parameters for the redis client.
  ///
  /// Built field by field rather than from a `redis://` URL so IPv6 hosts
  /// and passwords need no escaping.
  pub fn connection_info(&self) -> ConnectionInfo {
    ConnectionInfo {
      addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
      redis: RedisConnectionInfo {
        db: self.database,
        password: (!self.password.is_empty()).then(|| self.password.clone()),
        ..Default::default()
      },
    }
  }
}
