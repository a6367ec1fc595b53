//! Redis cache facade
//!
//! Wraps a Redis connection behind a fixed set of string, sorted-set, list,
//! set, counter and expiry operations:
//! - Zero-valued config fields fall back to defaults
//! - Connecting fails fast if the server does not answer PING
//! - Nil replies surface as `None` instead of an error

mod client;
pub mod commands;
pub mod config;
mod error;
mod types;

pub use client::{with_deadline, Cache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use types::{ListEnd, ScoredMember};
