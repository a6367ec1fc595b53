use clap::{Parser, Subcommand};
use std::fmt;
use std::time::Duration;

use crate::cache::{Cache, CacheConfig, ListEnd, ScoredMember};

#[derive(Parser)]
#[command(name = "rcache", about = "Redis cache client", version)]
pub struct ClientArgs {
  /// Redis host
  #[arg(short = 'H', long, env = "RCACHE_HOST")]
  pub host: Option<String>,
  /// Redis port
  #[arg(short, long, env = "RCACHE_PORT")]
  pub port: Option<u16>,
  /// Redis password
  #[arg(short = 'a', long, env = "RCACHE_PASSWORD", hide_env_values = true)]
  pub password: Option<String>,
  /// Database index
  #[arg(short = 'n', long, env = "RCACHE_DB")]
  pub db: Option<i64>,
  #[arg(long, env = "RCACHE_MAX_RETRIES")]
  pub max_retries: Option<usize>,
  #[arg(long, env = "RCACHE_POOL_SIZE")]
  pub pool_size: Option<usize>,
  /// YAML config file (defaults to ./rcache.yaml when present)
  #[arg(short, long)]
  pub config: Option<String>,
  #[arg(long, default_value = "info")]
  pub log_level: String,
  #[command(subcommand)]
  pub action: CacheAction,
}

#[derive(Subcommand)]
pub enum CacheAction {
  /// Check the server answers
  Ping,
  /// Get a value by key
  Get { key: String },
  /// Set a value with optional TTL
  Set {
    key: String,
    value: String,
    /// TTL in seconds (0 = no expiry)
    #[arg(short, long, default_value = "0")]
    ttl: u64,
  },
  /// Delete one or more keys
  Del {
    #[arg(required = true)]
    keys: Vec<String>,
  },
  /// Increment an integer counter
  Incr { key: String },
  /// Set a key's time to live in seconds
  Expire { key: String, seconds: u64 },
  /// Add members to a sorted set: SCORE MEMBER [SCORE MEMBER ...]
  Zadd {
    key: String,
    #[arg(required = true, num_args = 2.., allow_negative_numbers = true)]
    score_members: Vec<String>,
  },
  /// Number of members in a sorted set
  Zcard { key: String },
  /// Pop the lowest-scored members
  Zpopmin {
    key: String,
    count: Option<i64>,
  },
  /// Score of a sorted-set member
  Zscore { key: String, member: String },
  /// Remove a sorted-set member
  Zrem { key: String, member: String },
  /// Members by rank range
  Zrange {
    key: String,
    #[arg(allow_negative_numbers = true)]
    start: i64,
    #[arg(allow_negative_numbers = true)]
    stop: i64,
  },
  /// Members by score range
  Zrangebyscore {
    key: String,
    #[arg(allow_hyphen_values = true)]
    min: String,
    #[arg(allow_hyphen_values = true)]
    max: String,
    #[arg(long, default_value = "0")]
    offset: i64,
    #[arg(long, default_value = "0")]
    count: i64,
    /// Include scores in the output
    #[arg(long)]
    withscores: bool,
  },
  /// Append values to a list
  Rpush {
    key: String,
    #[arg(required = true)]
    values: Vec<String>,
  },
  /// Length of a list
  Llen { key: String },
  /// Remove occurrences of a value from a list
  Lrem {
    key: String,
    #[arg(allow_negative_numbers = true)]
    count: i64,
    value: String,
  },
  /// Overwrite the element at an index
  Lset {
    key: String,
    #[arg(allow_negative_numbers = true)]
    index: i64,
    value: String,
  },
  /// Pop the first element of a list
  Lpop { key: String },
  /// Elements in an index range
  Lrange {
    key: String,
    #[arg(allow_negative_numbers = true)]
    start: i64,
    #[arg(allow_negative_numbers = true)]
    stop: i64,
  },
  /// Move an element between lists (ends: left|right)
  Lmove {
    source: String,
    destination: String,
    from: ListEnd,
    to: ListEnd,
  },
  /// Members of a set
  Smembers { key: String },
  /// Add members to a set
  Sadd {
    key: String,
    #[arg(required = true)]
    members: Vec<String>,
  },
}

/// A reply rendered the way redis-cli shows it.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
  Status(String),
  Integer(i64),
  Bulk(Option<String>),
  Score(Option<f64>),
  List(Vec<String>),
  Scored(Vec<ScoredMember>),
}

impl fmt::Display for Reply {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Reply::Status(s) => write!(f, "{}", s),
      Reply::Integer(i) => write!(f, "(integer) {}", i),
      Reply::Bulk(Some(s)) => write!(f, "\"{}\"", s),
      Reply::Score(Some(score)) => write!(f, "\"{}\"", score),
      Reply::Bulk(None) | Reply::Score(None) => write!(f, "(nil)"),
      Reply::List(items) if items.is_empty() => write!(f, "(empty array)"),
      Reply::Scored(items) if items.is_empty() => write!(f, "(empty array)"),
      Reply::List(items) => {
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            writeln!(f)?;
          }
          write!(f, "{}) \"{}\"", i + 1, item)?;
        }
        Ok(())
      }
      Reply::Scored(items) => {
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            writeln!(f)?;
          }
          write!(f, "{}) \"{}\"\n{}) \"{}\"", 2 * i + 1, item.member, 2 * i + 2, item.score)?;
        }
        Ok(())
      }
    }
  }
}

/// Build the connection config: file (explicit or auto-detected), then flags.
pub fn load_config(args: &ClientArgs) -> Result<CacheConfig, anyhow::Error> {
  let mut config = if let Some(path) = &args.config {
    CacheConfig::from_file(path)?
  } else {
    CacheConfig::find_and_load()?.unwrap_or_default()
  };

  if let Some(host) = &args.host {
    config.host = host.clone();
  }
  if let Some(port) = args.port {
    config.port = port;
  }
  if let Some(password) = &args.password {
    config.password = password.clone();
  }
  if let Some(db) = args.db {
    config.database = db;
  }
  if let Some(n) = args.max_retries {
    config.max_retries = n;
  }
  if let Some(n) = args.pool_size {
    config.pool_size = n;
  }

  Ok(config)
}

/// Parse `SCORE MEMBER [SCORE MEMBER ...]` into sorted-set members.
pub fn parse_score_members(args: &[String]) -> Result<Vec<ScoredMember>, anyhow::Error> {
  if args.len() % 2 != 0 {
    anyhow::bail!("expected SCORE MEMBER pairs, got {} arguments", args.len());
  }
  args
    .chunks_exact(2)
    .map(|pair| {
      let score: f64 = pair[0]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid score: {}", pair[0]))?;
      Ok(ScoredMember::new(pair[1].clone(), score))
    })
    .collect()
}

pub async fn run_cache(cache: &Cache, action: &CacheAction) -> Result<Reply, anyhow::Error> {
  let reply = match action {
    CacheAction::Ping => Reply::Status(cache.ping().await?),
    CacheAction::Get { key } => Reply::Bulk(cache.get(key).await?),
    CacheAction::Set { key, value, ttl } => {
      let ttl = (*ttl > 0).then(|| Duration::from_secs(*ttl));
      Reply::Status(cache.set(key, value, ttl).await?)
    }
    CacheAction::Del { keys } => {
      let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
      Reply::Integer(cache.del(&keys).await?)
    }
    CacheAction::Incr { key } => Reply::Integer(cache.incr(key).await?),
    CacheAction::Expire { key, seconds } => {
      let set = cache.expire(key, Duration::from_secs(*seconds)).await?;
      Reply::Integer(i64::from(set))
    }
    CacheAction::Zadd { key, score_members } => {
      let members = parse_score_members(score_members)?;
      Reply::Integer(cache.zadd(key, &members).await?)
    }
    CacheAction::Zcard { key } => Reply::Integer(cache.zcard(key).await?),
    CacheAction::Zpopmin { key, count } => Reply::Scored(cache.zpopmin(key, *count).await?),
    CacheAction::Zscore { key, member } => Reply::Score(cache.zscore(key, member).await?),
    CacheAction::Zrem { key, member } => Reply::Integer(cache.zrem(key, member).await?),
    CacheAction::Zrange { key, start, stop } => {
      Reply::List(cache.zrange(key, *start, *stop).await?)
    }
    CacheAction::Zrangebyscore {
      key,
      min,
      max,
      offset,
      count,
      withscores,
    } => {
      if *withscores {
        Reply::Scored(
          cache
            .zrangebyscore_withscores(key, min, max, *offset, *count)
            .await?,
        )
      } else {
        Reply::List(cache.zrangebyscore(key, min, max, *offset, *count).await?)
      }
    }
    CacheAction::Rpush { key, values } => Reply::Integer(cache.rpush(key, values.as_slice()).await?),
    CacheAction::Llen { key } => Reply::Integer(cache.llen(key).await?),
    CacheAction::Lrem { key, count, value } => {
      Reply::Integer(cache.lrem(key, *count, value).await?)
    }
    CacheAction::Lset { key, index, value } => {
      Reply::Status(cache.lset(key, *index, value).await?)
    }
    CacheAction::Lpop { key } => Reply::Bulk(cache.lpop(key).await?),
    CacheAction::Lrange { key, start, stop } => {
      Reply::List(cache.lrange(key, *start, *stop).await?)
    }
    CacheAction::Lmove {
      source,
      destination,
      from,
      to,
    } => Reply::Bulk(cache.lmove(source, destination, *from, *to).await?),
    CacheAction::Smembers { key } => Reply::List(cache.smembers(key).await?),
    CacheAction::Sadd { key, members } => Reply::Integer(cache.sadd(key, members.as_slice()).await?),
  };
  Ok(reply)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_score_members() {
    let args: Vec<String> = ["1.5", "a", "-2", "b"].iter().map(|s| s.to_string()).collect();
    let members = parse_score_members(&args).unwrap();
    assert_eq!(
      members,
      vec![ScoredMember::new("a", 1.5), ScoredMember::new("b", -2.0)]
    );
  }

  #[test]
  fn test_parse_score_members_rejects_odd_and_bad_scores() {
    let odd: Vec<String> = vec!["1".into()];
    assert!(parse_score_members(&odd).is_err());
    let bad: Vec<String> = vec!["high".into(), "a".into()];
    assert!(parse_score_members(&bad).is_err());
  }

  #[test]
  fn test_reply_display() {
    assert_eq!(Reply::Status("PONG".into()).to_string(), "PONG");
    assert_eq!(Reply::Integer(3).to_string(), "(integer) 3");
    assert_eq!(Reply::Bulk(None).to_string(), "(nil)");
    assert_eq!(Reply::Bulk(Some("v".into())).to_string(), "\"v\"");
    assert_eq!(Reply::List(vec![]).to_string(), "(empty array)");
    assert_eq!(
      Reply::List(vec!["a".into(), "b".into()]).to_string(),
      "1) \"a\"\n2) \"b\""
    );
    assert_eq!(
      Reply::Scored(vec![ScoredMember::new("a", 1.5)]).to_string(),
      "1) \"a\"\n2) \"1.5\""
    );
  }

  #[test]
  fn test_args_parse_negative_ranges() {
    let args = ClientArgs::try_parse_from(["rcache", "lrange", "jobs", "0", "-1"]).unwrap();
    match args.action {
      CacheAction::Lrange { key, start, stop } => {
        assert_eq!(key, "jobs");
        assert_eq!((start, stop), (0, -1));
      }
      _ => panic!("expected lrange"),
    }
  }

  #[test]
  fn test_args_parse_lmove_ends() {
    let args = ClientArgs::try_parse_from(["rcache", "lmove", "a", "b", "left", "right"]).unwrap();
    match args.action {
      CacheAction::Lmove { from, to, .. } => {
        assert_eq!(from, ListEnd::Left);
        assert_eq!(to, ListEnd::Right);
      }
      _ => panic!("expected lmove"),
    }
  }

  #[test]
  fn test_flags_override_defaults() {
    let args = ClientArgs::try_parse_from([
      "rcache", "-H", "10.0.0.5", "-p", "7000", "-n", "2", "--pool-size", "4", "ping",
    ])
    .unwrap();
    let config = load_config(&args).unwrap();
    assert_eq!(config.host, "10.0.0.5");
    assert_eq!(config.port, 7000);
    assert_eq!(config.database, 2);
    assert_eq!(config.pool_size, 4);
  }
}
