use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::{Extension, Router};
use leafscan_utils::config::ConfigConsumer;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::context::AppContext;
use crate::handlers;

pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/predict", post(handlers::predict))
        .route("/api/stats", get(handlers::stats))
        .layer(Extension(context))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// A bound listener waiting to serve a router.
pub struct HttpServer {
    listener: TcpListener,
}

impl ConfigConsumer for HttpServer {
    const KEY: &'static str = "http";

    type Config = HttpConfig;
}

impl HttpServer {
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener.local_addr().map_err(Into::into)
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    pub async fn serve<F>(self, router: Router, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .context("failed to run http server")
    }
}
