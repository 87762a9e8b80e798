use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;

use super::ApiError;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::router::AppState;

/// Revoke the refresh cookie's token, plus the bearer token when one is sent.
pub async fn logout<AS: AuthServicePort>(
    State(state): State<AppState<AS>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let refresh_token = state
        .refresh_cookie
        .read(&jar)
        .ok_or_else(ApiError::invalid_token)?
        .to_string();

    state
        .auth_service
        .logout(&refresh_token, bearer_token(&headers))
        .await?;

    Ok((state.refresh_cookie.clear(jar), StatusCode::NO_CONTENT))
}
