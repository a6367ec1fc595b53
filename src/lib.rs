pub mod cache;

// Command-line front end (only compiled with cli feature)
#[cfg(feature = "cli")]
pub mod cli;

pub use cache::{Cache, CacheConfig, CacheError, ListEnd, ScoredMember};
