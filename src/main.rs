use log::info;
use ssi_whatsapp_lib::engine::config::GatewayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GatewayConfig::from_env();
    info!(
        "Session path: {} (listening on {})",
        config.session_path.display(),
        config.listen_addr()
    );

    ssi_whatsapp_lib::run(
        config,
        ssi_whatsapp_lib::shutdown_on(tokio::signal::ctrl_c()),
    )
    .await?;
    Ok(())
}
