use crate::api::ErrorResponse;
use crate::auth::{revoke_token, token_from_headers, AuthUser};
use crate::get_conn;
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

#[utoipa::path(
    post,
    path = "/api/auth/token/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn logout(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    // AuthUser already validated the header; re-read it for the raw token.
    let token = match token_from_headers(&headers) {
        Ok(t) => t,
        Err(e) => return e.into_response(),
    };

    let mut conn = get_conn!(state.pool);

    match revoke_token(&mut conn, token) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!("Failed to revoke token: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to revoke token".to_string(),
                }),
            )
                .into_response()
        }
    }
}
