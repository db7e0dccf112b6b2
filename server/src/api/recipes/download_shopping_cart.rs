use crate::api::{ErrorResponse, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::get_conn;
use crate::schema::{ingredients, recipe_ingredients, shopping_cart_items};
use crate::shopping_list::{aggregate, render_csv, render_pdf, render_txt};
use crate::AppState;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DownloadParams {
    /// Export format: txt (default), csv or pdf
    pub format: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    params(DownloadParams),
    responses(
        (status = 200, description = "Aggregated shopping list attachment"),
        (status = 400, description = "Unknown format", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Response {
    let format = params.format.as_deref().unwrap_or("txt");
    if !matches!(format, "txt" | "csv" | "pdf") {
        return ValidationErrorResponse::single(
            "format",
            format!("Unknown format '{}'; expected txt, csv or pdf", format),
        )
        .into_response();
    }

    let mut conn = get_conn!(state.pool);

    // Every ingredient line of every recipe in the caller's cart;
    // grouping and summing happen in aggregate()
    let rows: Vec<(String, String, i32)> = match recipe_ingredients::table
        .inner_join(ingredients::table)
        .inner_join(
            shopping_cart_items::table
                .on(shopping_cart_items::recipe_id.eq(recipe_ingredients::recipe_id)),
        )
        .filter(shopping_cart_items::user_id.eq(user.id))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch shopping cart: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch shopping cart".to_string(),
                }),
            )
                .into_response();
        }
    };

    let entries = aggregate(rows);

    let (content_type, filename, body) = match format {
        "csv" => match render_csv(&entries) {
            Ok(bytes) => ("text/csv", "shopping_list.csv", bytes),
            Err(e) => {
                tracing::error!("Failed to render CSV shopping list: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to render shopping list".to_string(),
                    }),
                )
                    .into_response();
            }
        },
        "pdf" => match render_pdf(&entries, &user.full_name(), Utc::now()) {
            Ok(bytes) => ("application/pdf", "foodgram_shopping_list.pdf", bytes),
            Err(e) => {
                tracing::error!("Failed to render PDF shopping list: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to render shopping list".to_string(),
                    }),
                )
                    .into_response();
            }
        },
        _ => (
            "text/plain",
            "shopping_list.txt",
            render_txt(&entries).into_bytes(),
        ),
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(body))
        .unwrap()
        .into_response()
}
