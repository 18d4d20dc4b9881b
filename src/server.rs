use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};
use tokio_util::sync::CancellationToken;

use crate::{
    Res,
    api::{self, SiteState},
    spotify::auth::CodeExchange,
    types::AuthSession,
};

pub async fn bind(addr: &str) -> Res<TcpListener> {
    let addr = SocketAddr::from_str(addr)?;
    Ok(TcpListener::bind(addr).await?)
}

/// Site routes. The refresh route reads the peer address, so the router has
/// to be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn site_router(site: SiteState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/now-playing", get(api::now_playing_fragment))
        .route("/api/now-playing", get(api::now_playing_status))
        .route("/api/spotify/refresh", post(api::refresh))
        .route("/health", get(api::health))
        .layer(Extension(site))
}

pub fn callback_router(
    session: Arc<Mutex<Option<AuthSession>>>,
    exchange: CodeExchange,
) -> Router {
    Router::new()
        .route("/callback", get(api::callback))
        .layer(Extension(session))
        .layer(Extension(exchange))
}

/// Serves the site until `shutdown` is cancelled.
pub async fn start_site_server(
    listener: TcpListener,
    site: SiteState,
    shutdown: CancellationToken,
) -> Res<()> {
    let app = site_router(site).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

pub async fn start_callback_server(
    listener: TcpListener,
    session: Arc<Mutex<Option<AuthSession>>>,
    exchange: CodeExchange,
) -> Res<()> {
    axum::serve(listener, callback_router(session, exchange)).await?;
    Ok(())
}
