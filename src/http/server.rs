//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the mapping handler as fallback
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Hand every request to the mapping service
//! - Apply configuration updates from the file watcher

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::request::{request_context, X_REQUEST_ID};
use crate::http::response::BufferedResponse;
use crate::lifecycle::shutdown;
use crate::observability::tracing::make_request_span;
use crate::service::{MappingService, Outcome, ServiceError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MappingService>,
}

/// HTTP front end of the URL mapping service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    service: Arc<MappingService>,
}

impl HttpServer {
    /// Create a server whose handlers come from the configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let service = Arc::new(MappingService::from_config(&config.urlmapping)?);
        Ok(Self::with_service(config, service))
    }

    /// Create a server around an already assembled service.
    pub fn with_service(config: ServiceConfig, service: Arc<MappingService>) -> Self {
        let router = Self::build_router(&config, AppState { service: service.clone() });
        Self {
            router,
            config,
            service,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new().fallback(mapping_handler).with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
    }

    /// The router, for serving it elsewhere or driving it in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn service(&self) -> &Arc<MappingService> {
        &self.service
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, applying configuration
    /// updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, prefixes = ?self.service.supported_prefixes(), "HTTP server starting");

        let service = self.service.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        let reloader = tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => {
                        let Some(config) = update else { break };
                        if let Err(e) = service.reload(&config.urlmapping) {
                            tracing::error!(error = %e, "Failed to apply configuration, keeping current URL mappings");
                        }
                    }
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Map the request path and answer with the delivered response.
async fn mapping_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let context = request_context(&uri, &headers);
    let mut response = BufferedResponse::new();

    match state.service.handle(uri.path(), method.as_str(), &context, &mut response) {
        Ok(Outcome::Delivered(_)) => response.into_response(),
        Ok(Outcome::Unmapped) => (StatusCode::NOT_FOUND, "No URL mapping for this path").into_response(),
        Err(e) => {
            tracing::error!(request_id = ?context.request_id, error = %e, "URL mapping failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to redirect").into_response()
        }
    }
}
