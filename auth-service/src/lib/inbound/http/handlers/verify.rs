use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResponseData {
    pub user_id: i64,
}

pub async fn verify(
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiSuccess<VerifyResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        VerifyResponseData {
            user_id: user.user_id.0,
        },
    )
}
