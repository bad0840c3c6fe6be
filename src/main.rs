use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod db;
mod state;

use recipes_backend::config;
use recipes_backend::RecipeService;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipes_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    config::init_config().map_err(anyhow::Error::msg)?;
    let app_config = config::config();
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    let store = db::open_store(&app_config).await?;

    let state = Arc::new(AppState {
        recipes: RecipeService::new(store),
    });

    let routes = api::router(state);
    let context_path = app_config.get_context_path();
    let app = if context_path.is_empty() {
        routes
    } else {
        axum::Router::new().nest(&context_path, routes)
    };
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}{}", bind_addr, context_path);

    axum::serve(listener, app).await?;

    Ok(())
}
