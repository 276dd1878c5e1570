use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use bonk_api::config::Config;
use bonk_api::routes::{create_router, AppState};
use bonk_api::services::providers::innertube::InnertubeProvider;
use bonk_api::services::search::SearchDefaults;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bonk_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let provider = InnertubeProvider::from_config(&config)
        .map_err(|err| anyhow::anyhow!("Failed to build search provider: {}", err))?;

    let state = AppState {
        provider: Arc::new(provider),
        defaults: SearchDefaults {
            term: config.search_term.clone(),
            limit: config.search_limit,
            pages: config.search_pages,
        },
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
