use clap::Parser;
use rediscache::cli::{load_config, run_cache, ClientArgs};
use rediscache::Cache;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
  let args = ClientArgs::parse();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| args.log_level.clone().into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let config = load_config(&args)?;
  let cache = Cache::connect_or_exit(config).await;

  let result = run_cache(&cache, &args.action).await;
  cache.close()?;

  println!("{}", result?);
  Ok(())
}
