mod commands;

pub use commands::{
  load_config, parse_score_members, run_cache, CacheAction, ClientArgs, Reply,
};
