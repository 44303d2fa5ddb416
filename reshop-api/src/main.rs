use anyhow::Context;
use reshop_api::Shop;
use reshop_core::LogNotifier;
use reshop_store::app_config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Every workspace crate logs its state changes at info level
const DEFAULT_LOG_FILTER: &str =
    "reshop_api=info,reshop_store=info,reshop_core=info,reshop_order=info,reshop_catalog=info";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Opening shop with data file {}", config.data.path);

    let shop = Shop::open(&config, Box::new(LogNotifier));

    let overview = serde_json::to_string_pretty(&shop.overview())
        .context("Failed to render shop overview")?;
    println!("{}", overview);

    shop.save().context("Failed to save shop data")?;
    Ok(())
}
