//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, CORS)
//! - Bind server to listener
//! - Dispatch `/<prefix>/<service>/...` to the forwarding engine

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::forward::{is_forwarded_method, Forwarder, ProxyResponse};
use crate::http::landing::{health_handler, landing_handler};
use crate::http::request::{into_proxy_request, request_id, MakeGatewayRequestId};
use crate::http::response::not_found;
use crate::observability::metrics;
use crate::routing::{match_route, ServiceRegistry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
    pub forwarder: Forwarder,
    pub prefix: Arc<str>,
    pub max_body_size: usize,
    pub landing_page: Option<Arc<str>>,
    /// Port reported by the liveness probe.
    pub port: u16,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    config: GatewayConfig,
    registry: Arc<ServiceRegistry>,
    forwarder: Forwarder,
}

impl HttpServer {
    /// Create a new HTTP server with the given (validated) configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let registry = Arc::new(ServiceRegistry::from_config(&config));
        let forwarder = Forwarder::new(config.upstream.timeout());
        Self {
            config,
            registry,
            forwarder,
        }
    }

    /// Build the Axum router, reporting `port` from the health probe.
    pub fn router(&self, port: u16) -> Router {
        let state = AppState {
            registry: self.registry.clone(),
            forwarder: self.forwarder.clone(),
            prefix: Arc::from(self.config.routing.prefix.as_str()),
            max_body_size: self.config.limits.max_body_size,
            landing_page: self.config.landing.index_path.as_deref().map(Arc::from),
            port,
        };
        Self::build_router(&self.config, state)
    }

    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let proxy_route = format!("/{}/{{*rest}}", config.routing.prefix);

        let router = Router::new()
            .route("/", get(landing_handler))
            .route("/health", get(health_handler))
            .route(&proxy_route, any(proxy_handler))
            .fallback(|| async { not_found() })
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeGatewayRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            );

        if config.cors.enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            services = self.registry.len(),
            prefix = %self.config.routing.prefix,
            "HTTP server starting"
        );

        let app = self
            .router(addr.port())
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }
}

/// Main proxy handler.
/// Resolves the service and forwards the request, or answers with an error.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let route = match_route(&path, &state.prefix);
    let (service, sub_path) = match &route {
        Some(route) => (route.service.as_ref(), route.sub_path),
        None => ("", ""),
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        service = %service,
        sub_path = %sub_path,
        "Dispatching request"
    );

    let response = match dispatch(&state, request, service, sub_path).await {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                service = %service,
                status = %response.status,
                "Relayed backend response"
            );
            response.into_response()
        }
        Err(err) => {
            report_error(&request_id, &err);
            err.into_response()
        }
    };

    metrics::record_request(
        &method,
        state.registry.registered_name(service),
        response.status().as_u16(),
        start_time,
    );
    response
}

/// Received → Resolving → Forwarding; each arm ends the request.
async fn dispatch(
    state: &AppState,
    request: Request<Body>,
    service: &str,
    sub_path: &str,
) -> Result<ProxyResponse, GatewayError> {
    if !is_forwarded_method(request.method()) {
        return Err(GatewayError::UnsupportedMethod(request.method().clone()));
    }

    let base_address = state.registry.resolve(service)?;
    let proxy_request = into_proxy_request(request, state.max_body_size).await?;

    state
        .forwarder
        .forward(base_address, sub_path, proxy_request)
        .await
        .map_err(|failure| GatewayError::Transport {
            service: service.to_string(),
            failure,
        })
}

fn report_error(request_id: &str, err: &GatewayError) {
    match err {
        GatewayError::Transport { service, failure } => {
            metrics::record_upstream_failure(service, failure.kind);
            tracing::error!(
                request_id = %request_id,
                service = %service,
                kind = %failure.kind,
                target_url = %failure.url,
                detail = %failure.detail,
                "Upstream request failed"
            );
        }
        GatewayError::UnknownService { name } => {
            tracing::warn!(request_id = %request_id, service = %name, "Unknown service");
        }
        other => {
            tracing::warn!(request_id = %request_id, error = %other, "Request rejected");
        }
    }
}
