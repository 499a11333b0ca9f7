//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Dispatch every request through the routing engine
//! - Swap in rebuilt route tables on config reload

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::request::to_match_request;
use crate::http::response::lookup_response;
use crate::observability::metrics;
use crate::routing::{RouteLookup, RouteRequest, Router as RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<ArcSwap<RouteTable>>,
    pub trust_forwarded_proto: bool,
}

/// HTTP front end for the routing engine.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    routes: Arc<ArcSwap<RouteTable>>,
}

impl HttpServer {
    /// Create a new HTTP server serving `routes`.
    pub fn new(config: AppConfig, routes: RouteTable) -> Self {
        let routes = Arc::new(ArcSwap::from_pointee(routes));
        let state = AppState {
            routes: routes.clone(),
            trust_forwarded_proto: config.listener.trust_forwarded_proto,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            routes,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(route_handler))
            .route("/", any(route_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The service, for driving requests in-process.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live route table.
    pub fn routes(&self) -> Arc<ArcSwap<RouteTable>> {
        self.routes.clone()
    }

    /// Rebuild and publish the route table for every config received.
    ///
    /// A config whose routes fail to compile is dropped and the current
    /// table stays in place.
    pub fn spawn_reloader(&self, mut updates: mpsc::UnboundedReceiver<AppConfig>) -> JoinHandle<()> {
        let routes = self.routes.clone();
        tokio::spawn(async move {
            while let Some(config) = updates.recv().await {
                match RouteTable::from_config(&config) {
                    Ok(table) => {
                        let count = table.routes().routes().len();
                        routes.store(Arc::new(table));
                        metrics::record_reload("success");
                        tracing::info!(routes = count, "Route table reloaded");
                    }
                    Err(e) => {
                        metrics::record_reload("failure");
                        tracing::error!(error = %e, "Rejected reloaded routes. Keeping current route table.");
                    }
                }
            }
        })
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Resolve the request against the current route table.
async fn route_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let match_request = to_match_request(&request, state.trust_forwarded_proto);
    let table = state.routes.load_full();
    let result = table.dispatch(&match_request);

    match &result {
        Ok(RouteLookup::NotFound) => tracing::warn!(
            request_id = %request_id,
            method = %match_request.method(),
            path = %match_request.path(),
            "No route matched"
        ),
        Ok(RouteLookup::MethodNotAllowed { allowed }) => tracing::warn!(
            request_id = %request_id,
            method = %match_request.method(),
            path = %match_request.path(),
            allowed = %allowed.header_value(),
            "Method not allowed"
        ),
        Ok(lookup) => tracing::debug!(
            request_id = %request_id,
            outcome = lookup.outcome(),
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "Route resolved"
        ),
        Err(_) => {}
    }

    lookup_response(result).into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
