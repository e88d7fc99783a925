mod api;
mod middleware;
mod sync;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use ahat_core::{AppConfig, DataSource};
use ahat_db::{MockProductStore, PgProductStore, ProductStore};
use ahat_deals::DealsClient;
use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    sync::{DealProvider, LiveDealProvider, MockDealProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(ahat_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        env = %config.env,
        data_source = %config.data_source,
        bind_addr = %config.bind_addr,
        "starting ahat-server"
    );

    let state = build_state(Arc::clone(&config)).await?;
    let app = build_app(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn build_state(config: Arc<AppConfig>) -> anyhow::Result<AppState> {
    let (store, deals): (Arc<dyn ProductStore>, Arc<dyn DealProvider>) = match config.data_source
    {
        DataSource::Mock => {
            let store: Arc<dyn ProductStore> = Arc::new(MockProductStore);
            let deals: Arc<dyn DealProvider> = Arc::new(MockDealProvider);
            (store, deals)
        }
        DataSource::Database => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the database data source")?;
            let pool_config = ahat_db::PoolConfig::from_app_config(&config);
            let pool = ahat_db::connect_pool(database_url, pool_config).await?;
            let applied = ahat_db::run_migrations(&pool).await?;
            tracing::info!(applied, "database migrations complete");

            let store: Arc<dyn ProductStore> = Arc::new(PgProductStore::new(pool));
            let client = DealsClient::with_base_url(
                config.deals_request_timeout_secs,
                &config.deals_api_url,
            )?;
            let deals: Arc<dyn DealProvider> = Arc::new(LiveDealProvider::new(
                client,
                Arc::clone(&store),
                config.deals_max_pages,
            ));
            (store, deals)
        }
    };

    Ok(AppState {
        config,
        store,
        deals,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
