//! Command builders
//!
//! One function per cache operation, each turning the operation's arguments
//! into the `redis::Cmd` the facade sends. Keeping them free of I/O lets the
//! argument layout be checked without a server.

use redis::{Cmd, ToRedisArgs};
use std::time::Duration;

use super::types::{ListEnd, ScoredMember, Ttl};

pub fn ping() -> Cmd {
  redis::cmd("PING")
}

pub fn get(key: &str) -> Cmd {
  let mut cmd = redis::cmd("GET");
  cmd.arg(key);
  cmd
}

/// SET key value, with EX/PX when a non-zero expiry is given.
pub fn set<V: ToRedisArgs>(key: &str, value: V, expiration: Option<Duration>) -> Cmd {
  let mut cmd = redis::cmd("SET");
  cmd.arg(key).arg(value);
  match expiration.filter(|ttl| !ttl.is_zero()).map(Ttl::from_duration) {
    Some(Ttl::Seconds(secs)) => {
      cmd.arg("EX").arg(secs);
    }
    Some(Ttl::Millis(ms)) => {
      cmd.arg("PX").arg(ms);
    }
    None => {}
  }
  cmd
}

pub fn del(keys: &[&str]) -> Cmd {
  let mut cmd = redis::cmd("DEL");
  cmd.arg(keys);
  cmd
}

pub fn zadd(key: &str, members: &[ScoredMember]) -> Cmd {
  let mut cmd = redis::cmd("ZADD");
  cmd.arg(key);
  for m in members {
    cmd.arg(m.score).arg(&m.member);
  }
  cmd
}

pub fn zcard(key: &str) -> Cmd {
  let mut cmd = redis::cmd("ZCARD");
  cmd.arg(key);
  cmd
}

pub fn zpopmin(key: &str, count: Option<i64>) -> Cmd {
  let mut cmd = redis::cmd("ZPOPMIN");
  cmd.arg(key);
  if let Some(count) = count {
    cmd.arg(count);
  }
  cmd
}

pub fn zscore(key: &str, member: &str) -> Cmd {
  let mut cmd = redis::cmd("ZSCORE");
  cmd.arg(key).arg(member);
  cmd
}

pub fn zrem(key: &str, member: &str) -> Cmd {
  let mut cmd = redis::cmd("ZREM");
  cmd.arg(key).arg(member);
  cmd
}

pub fn zrange(key: &str, start: i64, stop: i64) -> Cmd {
  let mut cmd = redis::cmd("ZRANGE");
  cmd.arg(key).arg(start).arg(stop);
  cmd
}

/// ZRANGEBYSCORE key min max [WITHSCORES] [LIMIT offset count].
///
/// `min`/`max` are passed as-is so callers can use `-inf`, `+inf` and the
/// exclusive `(` prefix. LIMIT is only sent when offset or count is non-zero.
pub fn zrangebyscore(
  key: &str,
  min: &str,
  max: &str,
  offset: i64,
  count: i64,
  with_scores: bool,
) -> Cmd {
  let mut cmd = redis::cmd("ZRANGEBYSCORE");
  cmd.arg(key).arg(min).arg(max);
  if with_scores {
    cmd.arg("WITHSCORES");
  }
  if offset != 0 || count != 0 {
    cmd.arg("LIMIT").arg(offset).arg(count);
  }
  cmd
}

pub fn rpush<V: ToRedisArgs>(key: &str, values: &[V]) -> Cmd {
  let mut cmd = redis::cmd("RPUSH");
  cmd.arg(key).arg(values);
  cmd
}

pub fn llen(key: &str) -> Cmd {
  let mut cmd = redis::cmd("LLEN");
  cmd.arg(key);
  cmd
}

pub fn lrem<V: ToRedisArgs>(key: &str, count: i64, value: V) -> Cmd {
  let mut cmd = redis::cmd("LREM");
  cmd.arg(key).arg(count).arg(value);
  cmd
}

pub fn lset<V: ToRedisArgs>(key: &str, index: i64, value: V) -> Cmd {
  let mut cmd = redis::cmd("LSET");
  cmd.arg(key).arg(index).arg(value);
  cmd
}

pub fn lpop(key: &str) -> Cmd {
  let mut cmd = redis::cmd("LPOP");
  cmd.arg(key);
  cmd
}

pub fn lrange(key: &str, start: i64, stop: i64) -> Cmd {
  let mut cmd = redis::cmd("LRANGE");
  cmd.arg(key).arg(start).arg(stop);
  cmd
}

pub fn lmove(source: &str, destination: &str, from: ListEnd, to: ListEnd) -> Cmd {
  let mut cmd = redis::cmd("LMOVE");
  cmd.arg(source).arg(destination).arg(from).arg(to);
  cmd
}

pub fn smembers(key: &str) -> Cmd {
  let mut cmd = redis::cmd("SMEMBERS");
  cmd.arg(key);
  cmd
}

pub fn sadd<V: ToRedisArgs>(key: &str, members: &[V]) -> Cmd {
  let mut cmd = redis::cmd("SADD");
  cmd.arg(key).arg(members);
  cmd
}

pub fn incr(key: &str) -> Cmd {
  let mut cmd = redis::cmd("INCR");
  cmd.arg(key);
  cmd
}

/// EXPIRE key seconds, or PEXPIRE key millis for fractional durations.
pub fn expire(key: &str, expiration: Duration) -> Cmd {
  match Ttl::from_duration(expiration) {
    Ttl::Seconds(secs) => {
      let mut cmd = redis::cmd("EXPIRE");
      cmd.arg(key).arg(secs);
      cmd
    }
    Ttl::Millis(ms) => {
      let mut cmd = redis::cmd("PEXPIRE");
      cmd.arg(key).arg(ms);
      cmd
    }
  }
}
