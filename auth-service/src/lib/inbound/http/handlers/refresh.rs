use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Rotate the pair carried by the refresh cookie.
pub async fn refresh<AS: AuthServicePort>(
    State(state): State<AppState<AS>>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<TokenResponseData>), ApiError> {
    let refresh_token = state
        .refresh_cookie
        .read(&jar)
        .ok_or_else(ApiError::invalid_token)?
        .to_string();

    let session = state
        .auth_service
        .refresh(&refresh_token, state.deadline())
        .await?;

    let data = TokenResponseData::from(&session);
    let jar = state
        .refresh_cookie
        .set(jar, session.tokens.refresh_token);

    Ok((jar, ApiSuccess::new(StatusCode::OK, data)))
}
