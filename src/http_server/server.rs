//! # HTTP Server
//!
//! Combines the health check and tours routers, adds CORS and request
//! tracing, and serves until the shutdown signal resolves.

use std::future::Future;
use std::io;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::health::health_routes;
use crate::store::DocumentStore;
use crate::tours::{route_not_found, tour_routes, TourHandler, TOURS_PATH};

/// HTTP server for the tours API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server around a tour handler
    pub fn new<S: DocumentStore + 'static>(
        config: HttpServerConfig,
        handler: Arc<TourHandler<S>>,
    ) -> Self {
        let router = Self::build_router(&config, handler);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router<S: DocumentStore + 'static>(
        config: &HttpServerConfig,
        handler: Arc<TourHandler<S>>,
    ) -> Router {
        Router::new()
            .merge(health_routes())
            .nest(TOURS_PATH, tour_routes(handler))
            .fallback(route_not_found)
            .layer(TraceLayer::new_for_http())
            .layer(config.cors_layer())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "App running");
        info!("Tours API available at http://{}{}", addr, TOURS_PATH);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}
