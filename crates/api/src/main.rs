use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ledgerly_observability::init();

    let config = ledgerly_api::config::AppConfig::from_env();
    let services = ledgerly_api::app::services::build_services(&config).await?;
    let app = ledgerly_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
