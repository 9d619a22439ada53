use anyhow::Context;
use core_runtime::config::ServerConfig;
use core_runtime::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the process environment still applies.
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    init_logging(config.logging()).context("failed to initialize logging")?;

    tracing::info!(?config, "Starting lyrics server");
    core_api::serve(config).await?;
    Ok(())
}
