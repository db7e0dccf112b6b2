use crate::api::users::with_recipes::{load_authors_with_recipes, UserWithRecipes};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::get_conn;
use crate::models::User;
use crate::pagination::{PageParams, Paginated};
use crate::schema::{subscriptions, users};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SubscriptionListParams {
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
    /// Page size (default: 6, max: 100)
    pub limit: Option<i64>,
    /// Trim each author's recipe list in the response
    pub recipes_limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(SubscriptionListParams),
    responses(
        (status = 200, description = "Paginated list of followed authors", body = Paginated<UserWithRecipes>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SubscriptionListParams>,
) -> Response {
    let page_params = PageParams {
        page: params.page,
        limit: params.limit,
    };

    let mut conn = get_conn!(state.pool);

    let followed = users::table
        .inner_join(subscriptions::table.on(subscriptions::author_id.eq(users::id)))
        .filter(subscriptions::user_id.eq(user.id));

    let count: i64 = match followed.clone().count().get_result(&mut conn) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to count subscriptions: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let authors: Vec<User> = match followed
        .order(users::username.asc())
        .limit(page_params.limit())
        .offset(page_params.offset())
        .select(User::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch subscriptions: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let results =
        match load_authors_with_recipes(&mut conn, &state.config, authors, params.recipes_limit) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Failed to load author recipes: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to fetch subscriptions".to_string(),
                    }),
                )
                    .into_response();
            }
        };

    (
        StatusCode::OK,
        Json(Paginated::new(
            results,
            count,
            &page_params,
            &state.config.base_url,
            "/api/users/subscriptions",
        )),
    )
        .into_response()
}
