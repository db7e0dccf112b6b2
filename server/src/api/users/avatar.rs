use crate::api::{ErrorResponse, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::get_conn;
use crate::media;
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
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetAvatarRequest {
    /// Base64 data URL, e.g. `data:image/png;base64,...`
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvatarResponse {
    /// Absolute URL of the stored avatar
    pub avatar: String,
}

#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    tag = "users",
    request_body = SetAvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "Invalid image payload", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn set_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetAvatarRequest>,
) -> Response {
    let avatar_path = match media::store_image(&state.config.media_root, "avatars", &req.avatar) {
        Ok(path) => path,
        Err(e) => {
            return ValidationErrorResponse::single("avatar", e.to_string()).into_response();
        }
    };

    let mut conn = get_conn!(state.pool);

    if let Err(e) = diesel::update(users::table.find(user.id))
        .set((
            users::avatar_path.eq(Some(&avatar_path)),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
    {
        tracing::error!("Failed to update avatar: {}", e);
        media::remove_image(&state.config.media_root, &avatar_path);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to update avatar".to_string(),
            }),
        )
            .into_response();
    }

    // Drop the previous file once the row points at the new one
    if let Some(old_path) = &user.avatar_path {
        media::remove_image(&state.config.media_root, old_path);
    }

    (
        StatusCode::OK,
        Json(AvatarResponse {
            avatar: media::media_url(&state.config.base_url, &avatar_path),
        }),
    )
        .into_response()
}

#[utoipa::path(
    delete,
    path = "/api/users/me/avatar",
    tag = "users",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn delete_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Response {
    let mut conn = get_conn!(state.pool);

    if let Err(e) = diesel::update(users::table.find(user.id))
        .set((
            users::avatar_path.eq(None::<String>),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
    {
        tracing::error!("Failed to clear avatar: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to remove avatar".to_string(),
            }),
        )
            .into_response();
    }

    if let Some(old_path) = &user.avatar_path {
        media::remove_image(&state.config.media_root, old_path);
    }

    StatusCode::NO_CONTENT.into_response()
}
