use anyhow::Context;

use sweetshop_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sweetshop_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "starting sweetshop api");

    let bind_addr = config.bind_addr;
    let app = sweetshop_api::app::build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
