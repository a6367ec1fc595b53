//! Configuration tests

use redis::ConnectionAddr;
use rediscache::cache::config::{expand_env_vars, DEFAULT_POOL_SIZE};
use rediscache::CacheConfig;
use std::io::Write;

// =============================================================================
// Default Resolution Tests
// =============================================================================

#[test]
fn test_cache_config_defaults() {
  let config = CacheConfig::default();
  assert_eq!(config.host, "127.0.0.1");
  assert_eq!(config.port, 6379);
  assert_eq!(config.password, "");
  assert_eq!(config.database, 0);
  assert_eq!(config.max_retries, 3);
  assert_eq!(config.pool_size, 10);
}

#[test]
fn test_zero_config_resolves_to_defaults() {
  let zero = CacheConfig {
    host: String::new(),
    port: 0,
    password: String::new(),
    database: 0,
    max_retries: 0,
    pool_size: 0,
  };
  assert_eq!(zero.resolve(), CacheConfig::default());
}

#[test]
fn test_resolve_keeps_explicit_values() {
  let config = CacheConfig {
    host: "cache.internal".into(),
    port: 6380,
    password: "pw".into(),
    database: 4,
    max_retries: 7,
    pool_size: 2,
  };
  assert_eq!(config.clone().resolve(), config);
}

#[test]
fn test_resolve_fills_only_zero_fields() {
  let config = CacheConfig {
    port: 0,
    pool_size: 0,
    host: "10.1.2.3".into(),
    ..CacheConfig::default()
  }
  .resolve();
  assert_eq!(config.host, "10.1.2.3");
  assert_eq!(config.port, 6379);
  assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
}

// =============================================================================
// Address / URL Tests
// =============================================================================

#[test]
fn test_address() {
  let config = CacheConfig {
    host: "localhost".into(),
    port: 9876,
    ..CacheConfig::default()
  };
  assert_eq!(config.address(), "localhost:9876");
}

#[test]
fn test_connection_info_with_password_and_db() {
  let config = CacheConfig {
    password: "596a96cc7bf9108cd896f33c44aedc8a".into(),
    database: 3,
    ..CacheConfig::default()
  };
  let info = config.connection_info();
  assert!(matches!(&info.addr, ConnectionAddr::Tcp(host, 6379) if host == "127.0.0.1"));
  assert_eq!(info.redis.db, 3);
  assert_eq!(
    info.redis.password.as_deref(),
    Some("596a96cc7bf9108cd896f33c44aedc8a")
  );
}

#[test]
fn test_connection_info_keeps_password_verbatim() {
  let config = CacheConfig {
    password: "p@ss/w:rd".into(),
    ..CacheConfig::default()
  };
  assert_eq!(
    config.connection_info().redis.password.as_deref(),
    Some("p@ss/w:rd")
  );
}

#[test]
fn test_connection_info_accepts_ipv6_host() {
  let config = CacheConfig {
    host: "::1".into(),
    ..CacheConfig::default()
  };
  let info = config.connection_info();
  assert!(matches!(&info.addr, ConnectionAddr::Tcp(host, 6379) if host == "::1"));
  assert!(redis::Client::open(info).is_ok());
}

// =============================================================================
// YAML Loading Tests
// =============================================================================

#[test]
fn test_from_yaml_partial_uses_field_defaults() {
  let config = CacheConfig::from_yaml("host: redis.local\npool_size: 20\n").unwrap();
  assert_eq!(config.host, "redis.local");
  assert_eq!(config.pool_size, 20);
  assert_eq!(config.port, 6379);
  assert_eq!(config.max_retries, 3);
  assert_eq!(config.database, 0);
}

#[test]
fn test_from_yaml_empty_mapping() {
  let config = CacheConfig::from_yaml("{}").unwrap();
  assert_eq!(config, CacheConfig::default());
}

#[test]
fn test_from_yaml_non_ascii_password() {
  let config = CacheConfig::from_yaml("password: \"pässwörd\"\n").unwrap();
  assert_eq!(config.password, "pässwörd");
}

#[test]
fn test_from_yaml_double_dollar_is_literal() {
  let config = CacheConfig::from_yaml("password: \"pa$$word\"\n").unwrap();
  assert_eq!(config.password, "pa$word");
}

#[test]
fn test_from_yaml_rejects_bad_types() {
  assert!(CacheConfig::from_yaml("port: not-a-number\n").is_err());
}

#[test]
fn test_from_file_expands_env() {
  std::env::set_var("RCACHE_TEST_FILE_PASSWORD", "from-env");
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "host: 10.0.0.9").unwrap();
  writeln!(file, "port: 6390").unwrap();
  writeln!(file, "password: ${{RCACHE_TEST_FILE_PASSWORD}}").unwrap();
  writeln!(file, "database: 1").unwrap();

  let config = CacheConfig::from_file(file.path()).unwrap();
  assert_eq!(config.host, "10.0.0.9");
  assert_eq!(config.port, 6390);
  assert_eq!(config.password, "from-env");
  assert_eq!(config.database, 1);
}

#[test]
fn test_from_file_missing() {
  let dir = tempfile::tempdir().unwrap();
  let result = CacheConfig::from_file(dir.path().join("nope.yaml"));
  assert!(matches!(result, Err(rediscache::CacheError::Io(_))));
}

#[test]
fn test_expand_env_vars_multiple() {
  std::env::set_var("RCACHE_TEST_A", "one");
  std::env::set_var("RCACHE_TEST_B", "two");
  assert_eq!(
    expand_env_vars("${RCACHE_TEST_A}-$RCACHE_TEST_B"),
    "one-two"
  );
}
