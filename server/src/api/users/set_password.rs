use crate::api::{ErrorResponse, ValidationErrorResponse};
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::constants::PASSWORD_MIN_LEN;
use crate::get_conn;
use crate::schema::users;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

#[utoipa::path(
    post,
    path = "/api/users/set_password",
    tag = "users",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn set_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetPasswordRequest>,
) -> Response {
    if !verify_password(&req.current_password, &user.password_hash) {
        return ValidationErrorResponse::single("current_password", "Wrong password")
            .into_response();
    }

    if req.new_password.len() < PASSWORD_MIN_LEN {
        return ValidationErrorResponse::single(
            "new_password",
            format!("Password must be at least {} characters", PASSWORD_MIN_LEN),
        )
        .into_response();
    }

    let password_hash = match hash_password(&req.new_password) {
        Ok(h) => h,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to hash password".to_string(),
                }),
            )
                .into_response()
        }
    };

    let mut conn = get_conn!(state.pool);

    match diesel::update(users::table.find(user.id))
        .set((
            users::password_hash.eq(&password_hash),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!("Failed to update password: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update password".to_string(),
                }),
            )
                .into_response()
        }
    }
}
