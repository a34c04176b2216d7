/*
 * Responsibility
 * - Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (CORS / HTTP 共通層)
 * - axum::serve() で起動
 */
use anyhow::Result;
use axum::Router;
use tracing_subscriber::EnvFilter;

use crate::{
    api,
    config::Config,
    middleware::{cors, http},
    repos::drink_repo::DrinkStore,
    services::auth::{AuthService, jwks::KeySetCache},
    state::AppState,
};

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let keys = KeySetCache::new(
        config.jwks_url.clone(),
        config.jwks_cache_ttl,
        config.jwks_fetch_timeout,
    )?;
    let auth = AuthService::new(
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
        keys,
    );
    let state = AppState::new(auth, DrinkStore::default());

    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState, config: &Config) -> Router {
    let v1 = api::v1::routes(state.clone());
    let app = Router::new().nest("/api/v1", v1).with_state(state);
    let app = cors::apply(app, config);
    http::apply(app)
}
