//! Value types exchanged with the cache

use redis::{RedisWrite, ToRedisArgs};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A sorted-set member together with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMember {
  pub member: String,
  pub score: f64,
}

impl ScoredMember {
  pub fn new(member: impl Into<String>, score: f64) -> Self {
    Self {
      member: member.into(),
      score,
    }
  }
}

impl From<(String, f64)> for ScoredMember {
  fn from((member, score): (String, f64)) -> Self {
    Self { member, score }
  }
}

/// Which end of a list LMOVE pops from or pushes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEnd {
  Left,
  Right,
}

impl ToRedisArgs for ListEnd {
  fn write_redis_args<W>(&self, out: &mut W)
  where
    W: ?Sized + RedisWrite,
  {
    out.write_arg(match self {
      ListEnd::Left => &b"LEFT"[..],
      ListEnd::Right => &b"RIGHT"[..],
    });
  }
}

impl std::fmt::Display for ListEnd {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ListEnd::Left => write!(f, "left"),
      ListEnd::Right => write!(f, "right"),
    }
  }
}

impl std::str::FromStr for ListEnd {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "left" | "l" | "head" => Ok(ListEnd::Left),
      "right" | "r" | "tail" => Ok(ListEnd::Right),
      _ => Err(format!("Unknown list end: {}", s)),
    }
  }
}

/// A TTL as Redis wants it: whole seconds when exact, milliseconds otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ttl {
  Seconds(u64),
  Millis(u64),
}

impl Ttl {
  pub(crate) fn from_duration(ttl: Duration) -> Self {
    if ttl.subsec_nanos() == 0 {
      Ttl::Seconds(ttl.as_secs())
    } else {
      // Round up to whole milliseconds; a tiny TTL never becomes 0.
      let millis = ttl.as_nanos().div_ceil(1_000_000);
      Ttl::Millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }
  }
}
