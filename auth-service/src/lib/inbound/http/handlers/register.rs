use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::CredentialsRequestBody;
use super::TokenResponseData;
use crate::domain::identity::errors::AuthError;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn register<AS: AuthServicePort>(
    State(state): State<AppState<AS>>,
    jar: CookieJar,
    Json(body): Json<CredentialsRequestBody>,
) -> Result<(CookieJar, ApiSuccess<TokenResponseData>), ApiError> {
    let email = EmailAddress::new(body.email).map_err(AuthError::from)?;
    let command = RegisterCommand::new(email, body.password);

    let session = state
        .auth_service
        .register(command, state.deadline())
        .await?;

    let data = TokenResponseData::from(&session);
    let jar = state
        .refresh_cookie
        .set(jar, session.tokens.refresh_token);

    Ok((jar, ApiSuccess::new(StatusCode::CREATED, data)))
}
