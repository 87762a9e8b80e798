use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Readiness flag and deployment metadata.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    environment: String,
}

impl HealthState {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            environment: environment.into(),
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusData {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionData {
    pub service: String,
    pub version: String,
    pub commit: String,
    pub built_at: String,
    pub environment: String,
}

pub async fn health() -> ApiSuccess<StatusData> {
    ApiSuccess::new(
        StatusCode::OK,
        StatusData {
            status: "ok".to_string(),
        },
    )
}

pub async fn ready<AS: AuthServicePort>(
    State(state): State<AppState<AS>>,
) -> Result<ApiSuccess<StatusData>, ApiError> {
    if !state.health.is_ready() {
        return Err(ApiError::ServiceUnavailable("Not ready".to_string()));
    }

    Ok(ApiSuccess::new(
        StatusCode::OK,
        StatusData {
            status: "ready".to_string(),
        },
    ))
}

pub async fn version<AS: AuthServicePort>(
    State(state): State<AppState<AS>>,
) -> ApiSuccess<VersionData> {
    ApiSuccess::new(
        StatusCode::OK,
        VersionData {
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_COMMIT").unwrap_or("unknown").to_string(),
            built_at: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
            environment: state.health.environment.clone(),
        },
    )
}
