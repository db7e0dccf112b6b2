use crate::api::ErrorResponse;
use crate::get_conn;
use crate::schema::recipes;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::dsl::exists;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GetLinkResponse {
    /// Absolute link to the recipe resource
    #[serde(rename = "short-link")]
    pub short_link: String,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Shareable link for the recipe", body = GetLinkResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_link(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let mut conn = get_conn!(state.pool);

    let found: bool = match diesel::select(exists(recipes::table.find(id))).get_result(&mut conn) {
        Ok(found) => found,
        Err(e) => {
            tracing::error!("Failed to check recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to build link".to_string(),
                }),
            )
                .into_response();
        }
    };

    if !found {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
            }),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(GetLinkResponse {
            short_link: format!("{}/api/recipes/{}", state.config.base_url, id),
        }),
    )
        .into_response()
}
