use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::cookies::RefreshCookie;
use super::handlers::health::health;
use super::handlers::health::ready;
use super::handlers::health::version;
use super::handlers::health::HealthState;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::verify::verify;
use super::middleware::require_access_token;
use crate::domain::identity::models::Deadline;
use crate::domain::identity::ports::AuthServicePort;

pub struct AppState<AS: AuthServicePort> {
    pub auth_service: Arc<AS>,
    pub refresh_cookie: RefreshCookie,
    pub store_timeout: Duration,
    pub health: Arc<HealthState>,
}

impl<AS: AuthServicePort> Clone for AppState<AS> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            refresh_cookie: self.refresh_cookie.clone(),
            store_timeout: self.store_timeout,
            health: Arc::clone(&self.health),
        }
    }
}

impl<AS: AuthServicePort> AppState<AS> {
    /// Deadline for the credential store calls of the request being served.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.store_timeout)
    }
}

pub fn create_router<AS: AuthServicePort>(state: AppState<AS>) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/register", post(register::<AS>))
        .route("/api/auth/login", post(login::<AS>))
        .route("/api/auth/refresh", post(refresh::<AS>))
        .route("/api/auth/logout", post(logout::<AS>))
        .route("/health", get(health))
        .route("/ready", get(ready::<AS>))
        .route("/version", get(version::<AS>));

    let protected_routes = Router::new()
        .route("/api/auth/verify", get(verify))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_token::<AS>,
        ));

    // Headers are left out of the span: they carry bearer tokens and cookies.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
