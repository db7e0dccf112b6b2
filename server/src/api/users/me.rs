use crate::api::users::profile::UserProfile;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn me(AuthUser(user): AuthUser, State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(UserProfile::from_user(&user, false, &state.config)),
    )
        .into_response()
}
