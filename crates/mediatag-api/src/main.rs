use mediatag_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    mediatag_api::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let (_state, router) = mediatag_api::setup::initialize_app(config.clone()).await?;

    mediatag_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
