use anyhow::Result;
use efficiency_service::{
    api::{self, AppState},
    config::AppConfig,
    metrics_server, observability, store, EfficiencyService,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let store = store::open(&cfg.store).await?;
    let service = EfficiencyService::new(store);

    if cfg.api.auth_bearer_token.is_none() {
        tracing::warn!("api.auth_bearer_token is not set; /efficiency endpoints are unauthenticated");
    }
    let state = AppState::new(service, cfg.api.auth_bearer_token.clone());

    api::serve(&cfg.api.bind_addr, state).await
}
