use std::sync::Arc;

use anyhow::Context;

use supplydesk_api::app::{AppServices, build_app};
use supplydesk_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    supplydesk_observability::init();

    let settings = Settings::from_env()?;
    let services = Arc::new(AppServices::from_settings(&settings).await?);
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(settings.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.http_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
