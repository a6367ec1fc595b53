//! Redis-backed cache facade

use parking_lot::RwLock;
use redis::aio::{ConnectionLike, ConnectionManager, ConnectionManagerConfig};
use redis::{Client, Cmd, FromRedisValue, ToRedisArgs, Value};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::commands;
use super::config::CacheConfig;
use super::error::{CacheError, Result};
use super::types::{ListEnd, ScoredMember};

/// Upper bound on each connect attempt made by the connection manager.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A narrow, uniform interface over a Redis connection.
///
/// Every operation forwards one command to the server. Replies that Redis
/// sends as nil for a missing key or member come back as `None`; operations
/// whose reply for a missing key is already an empty or zero value return it
/// unchanged. All other errors pass through as [`CacheError::Redis`].
///
/// Cloning is cheap and clones share the same connections, including the
/// closed state set by [`Cache::close`].
#[derive(Clone)]
pub struct Cache {
  inner: Arc<Inner>,
}

struct Inner {
  /// `None` once the cache has been closed.
  lanes: RwLock<Option<Vec<ConnectionManager>>>,
  next: AtomicUsize,
  config: CacheConfig,
}

impl Cache {
  /// Connect to Redis and verify the server answers a PING.
  ///
  /// Zero-valued config fields are replaced with defaults first. Opens
  /// `pool_size` multiplexed connections, each reconnecting up to
  /// `max_retries` times on failure.
  pub async fn connect(config: CacheConfig) -> Result<Self> {
    let config = config.resolve();
    if config.database < 0 {
      return Err(CacheError::Config(format!(
        "database index must not be negative, got {}",
        config.database
      )));
    }

    let addr = config.address();
    let unreachable = |source: redis::RedisError| CacheError::Unreachable {
      addr: addr.clone(),
      source,
    };

    let client = Client::open(config.connection_info()).map_err(unreachable)?;
    let mut lanes = Vec::with_capacity(config.pool_size);
    for _ in 0..config.pool_size {
      let manager_config = ConnectionManagerConfig::new()
        .set_number_of_retries(config.max_retries)
        .set_connection_timeout(CONNECT_TIMEOUT);
      let lane = ConnectionManager::new_with_config(client.clone(), manager_config)
        .await
        .map_err(unreachable)?;
      lanes.push(lane);
    }

    let mut probe = lanes[0].clone();
    commands::ping()
      .query_async::<String>(&mut probe)
      .await
      .map_err(unreachable)?;

    tracing::info!(host = %config.host, port = config.port, "connected to redis");

    Ok(Self {
      inner: Arc::new(Inner {
        lanes: RwLock::new(Some(lanes)),
        next: AtomicUsize::new(0),
        config,
      }),
    })
  }

  /// Like [`Cache::connect`], but an unreachable server terminates the
  /// process after logging the failure.
  pub async fn connect_or_exit(config: CacheConfig) -> Self {
    match Self::connect(config).await {
      Ok(cache) => cache,
      Err(e) => {
        tracing::error!(error = %e, "could not ping redis");
        std::process::exit(1);
      }
    }
  }

  /// The resolved configuration this cache was opened with.
  pub fn config(&self) -> &CacheConfig {
    &self.inner.config
  }

  /// A handle to one of the underlying connections, for commands this
  /// facade does not wrap.
  pub fn connection(&self) -> Result<ConnectionManager> {
    let lanes = self.inner.lanes.read();
    let lanes = lanes.as_ref().ok_or(CacheError::Closed)?;
    let idx = self.inner.next.fetch_add(1, Ordering::Relaxed) % lanes.len();
    Ok(lanes[idx].clone())
  }

  /// Release all connections. Later operations fail with
  /// [`CacheError::Closed`].
  pub fn close(&self) -> Result<()> {
    let lanes = self.inner.lanes.write().take();
    if let Some(lanes) = lanes {
      tracing::debug!(connections = lanes.len(), "closing redis connections");
    }
    Ok(())
  }

  pub fn is_closed(&self) -> bool {
    self.inner.lanes.read().is_none()
  }

  /// Send a command whose reply is never nil.
  async fn forward<T: FromRedisValue>(&self, cmd: Cmd) -> Result<T> {
    send(&mut self.connection()?, cmd).await
  }

  /// Send a command whose nil reply means "absent".
  async fn forward_optional<T: FromRedisValue>(&self, cmd: Cmd) -> Result<Option<T>> {
    send_optional(&mut self.connection()?, cmd).await
  }

  // -- Connection ------------------------------------------------------------

  pub async fn ping(&self) -> Result<String> {
    self.forward(commands::ping()).await
  }

  // -- Strings and keys ------------------------------------------------------

  pub async fn get(&self, key: &str) -> Result<Option<String>> {
    self.forward_optional(commands::get(key)).await
  }

  /// SET key value. `None` or a zero duration means no expiry.
  pub async fn set<V: ToRedisArgs>(
    &self,
    key: &str,
    value: V,
    expiration: Option<Duration>,
  ) -> Result<String> {
    self.forward(commands::set(key, value, expiration)).await
  }

  pub async fn del(&self, keys: &[&str]) -> Result<i64> {
    self.forward(commands::del(keys)).await
  }

  pub async fn incr(&self, key: &str) -> Result<i64> {
    self.forward(commands::incr(key)).await
  }

  /// Returns `false` when the key does not exist.
  pub async fn expire(&self, key: &str, expiration: Duration) -> Result<bool> {
    self.forward(commands::expire(key, expiration)).await
  }

  // -- Sorted sets -----------------------------------------------------------

  pub async fn zadd(&self, key: &str, members: &[ScoredMember]) -> Result<i64> {
    self.forward(commands::zadd(key, members)).await
  }

  pub async fn zcard(&self, key: &str) -> Result<i64> {
    self.forward(commands::zcard(key)).await
  }

  /// Pop the lowest-scored members, one unless `count` says otherwise.
  pub async fn zpopmin(&self, key: &str, count: Option<i64>) -> Result<Vec<ScoredMember>> {
    send_scored(&mut self.connection()?, commands::zpopmin(key, count)).await
  }

  pub async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>> {
    self.forward_optional(commands::zscore(key, member)).await
  }

  pub async fn zrem(&self, key: &str, member: &str) -> Result<i64> {
    self.forward(commands::zrem(key, member)).await
  }

  pub async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
    self.forward(commands::zrange(key, start, stop)).await
  }

  pub async fn zrangebyscore(
    &self,
    key: &str,
    min: &str,
    max: &str,
    offset: i64,
    count: i64,
  ) -> Result<Vec<String>> {
    self
      .forward(commands::zrangebyscore(key, min, max, offset, count, false))
      .await
  }

  pub async fn zrangebyscore_withscores(
    &self,
    key: &str,
    min: &str,
    max: &str,
    offset: i64,
    count: i64,
  ) -> Result<Vec<ScoredMember>> {
    let cmd = commands::zrangebyscore(key, min, max, offset, count, true);
    send_scored(&mut self.connection()?, cmd).await
  }

  // -- Lists -----------------------------------------------------------------

  pub async fn rpush<V: ToRedisArgs>(&self, key: &str, values: &[V]) -> Result<i64> {
    self.forward(commands::rpush(key, values)).await
  }

  pub async fn llen(&self, key: &str) -> Result<i64> {
    self.forward(commands::llen(key)).await
  }

  pub async fn lrem<V: ToRedisArgs>(&self, key: &str, count: i64, value: V) -> Result<i64> {
    self.forward(commands::lrem(key, count, value)).await
  }

  pub async fn lset<V: ToRedisArgs>(&self, key: &str, index: i64, value: V) -> Result<String> {
    self.forward(commands::lset(key, index, value)).await
  }

  pub async fn lpop(&self, key: &str) -> Result<Option<String>> {
    self.forward_optional(commands::lpop(key)).await
  }

  pub async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
    self.forward(commands::lrange(key, start, stop)).await
  }

  /// Atomically move one element between lists. `None` when `source` is
  /// empty.
  pub async fn lmove(
    &self,
    source: &str,
    destination: &str,
    from: ListEnd,
    to: ListEnd,
  ) -> Result<Option<String>> {
    self
      .forward_optional(commands::lmove(source, destination, from, to))
      .await
  }

  // -- Sets ------------------------------------------------------------------

  pub async fn smembers(&self, key: &str) -> Result<Vec<String>> {
    self.forward(commands::smembers(key)).await
  }

  pub async fn sadd<V: ToRedisArgs>(&self, key: &str, members: &[V]) -> Result<i64> {
    self.forward(commands::sadd(key, members)).await
  }
}

impl std::fmt::Debug for Cache {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Cache")
      .field("addr", &self.inner.config.address())
      .field("database", &self.inner.config.database)
      .field("closed", &self.is_closed())
      .finish()
  }
}

fn is_absent(value: &Value) -> bool {
  matches!(value, Value::Nil)
}

async fn send<C, T>(conn: &mut C, cmd: Cmd) -> Result<T>
where
  C: ConnectionLike,
  T: FromRedisValue,
{
  let value: Value = cmd.query_async(conn).await?;
  Ok(redis::from_owned_redis_value(value)?)
}

async fn send_optional<C, T>(conn: &mut C, cmd: Cmd) -> Result<Option<T>>
where
  C: ConnectionLike,
  T: FromRedisValue,
{
  let value: Value = cmd.query_async(conn).await?;
  if is_absent(&value) {
    return Ok(None);
  }
  Ok(Some(redis::from_owned_redis_value(value)?))
}

/// Member/score replies arrive as a flat `[member, score, ...]` array.
async fn send_scored<C: ConnectionLike>(conn: &mut C, cmd: Cmd) -> Result<Vec<ScoredMember>> {
  let pairs: Vec<(String, f64)> = send(conn, cmd).await?;
  Ok(pairs.into_iter().map(ScoredMember::from).collect())
}

/// Run a cache operation under a deadline.
///
/// Dropping the future cancels it; this maps an elapsed deadline to
/// [`CacheError::Timeout`].
pub async fn with_deadline<T, F>(deadline: Duration, op: F) -> Result<T>
where
  F: Future<Output = Result<T>>,
{
  tokio::time::timeout(deadline, op)
    .await
    .map_err(|_| CacheError::Timeout(deadline))?
}
