//! # HTTP Server
//!
//! Binds the cube routes behind a CORS layer.
//!
//! On shutdown every source gate is closed: requests still waiting for a
//! permit fail with 503 while in-flight round-trips finish.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::routes::cube_routes;
use crate::engine::QueryEngine;
use crate::observability::{Event, Logger};

/// HTTP server for the query engine
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
    engine: Arc<QueryEngine>,
}

impl HttpServer {
    pub fn with_engine(config: HttpServerConfig, engine: Arc<QueryEngine>) -> Self {
        let router = Self::build_router(&config, Arc::clone(&engine));
        Self {
            config,
            router,
            engine,
        }
    }

    fn build_router(config: &HttpServerConfig, engine: Arc<QueryEngine>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        cube_routes(engine).layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        self.start_with_shutdown(async {
            // A failed signal listener still shuts down.
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Serve until `signal` resolves, then close every source gate
    pub async fn start_with_shutdown<S>(self, signal: S) -> Result<(), std::io::Error>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        Logger::info(
            Event::ServerStart,
            &[
                ("addr", &local.to_string()),
                ("sources", &self.engine.registry().len().to_string()),
            ],
        );

        let engine = Arc::clone(&self.engine);
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                signal.await;
                engine.registry().close_all();
                Logger::info(
                    Event::ServerStop,
                    &[("sources", &engine.registry().len().to_string())],
                );
            })
            .await
    }
}
