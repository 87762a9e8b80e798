use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::CredentialsRequestBody;
use super::TokenResponseData;
use crate::domain::identity::models::Credentials;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn login<AS: AuthServicePort>(
    State(state): State<AppState<AS>>,
    jar: CookieJar,
    Json(body): Json<CredentialsRequestBody>,
) -> Result<(CookieJar, ApiSuccess<TokenResponseData>), ApiError> {
    let credentials = Credentials::new(body.email, body.password);

    let session = state
        .auth_service
        .login(credentials, state.deadline())
        .await?;

    let data = TokenResponseData::from(&session);
    let jar = state
        .refresh_cookie
        .set(jar, session.tokens.refresh_token);

    Ok((jar, ApiSuccess::new(StatusCode::OK, data)))
}
