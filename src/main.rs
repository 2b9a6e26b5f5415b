use anyhow::Result;
use clap::Parser;
use restaurant_cart::{
    cli::{Args, CliApp},
    utils::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = &args.storage_dir {
        config.storage_dir = dir.into();
    }

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!(
        "Configuration loaded for {} environment, cart stored in {}",
        config.environment,
        config.storage_dir.display()
    );

    let app = CliApp::new(&config).await?;
    app.run(args.command).await
}
