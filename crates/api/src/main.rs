use anyhow::Context;

use equipstock_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    equipstock_observability::init(config.log_format);

    let app = equipstock_api::app::build_app(&config)
        .await
        .context("failed to wire services")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        location_service = %config.location.base_url,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
