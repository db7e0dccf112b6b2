use crate::api::users::profile::UserProfile;
use crate::api::ErrorResponse;
use crate::auth::MaybeAuthUser;
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
use std::collections::HashSet;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated list of users", body = Paginated<UserProfile>)
    )
)]
pub async fn list_users(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Response {
    let mut conn = get_conn!(state.pool);

    let count: i64 = match users::table.count().get_result(&mut conn) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to count users: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch users".to_string(),
                }),
            )
                .into_response();
        }
    };

    let page: Vec<User> = match users::table
        .order(users::username.asc())
        .limit(params.limit())
        .offset(params.offset())
        .select(User::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch users: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch users".to_string(),
                }),
            )
                .into_response();
        }
    };

    // One query for all follow flags on this page
    let followed: HashSet<Uuid> = match &viewer {
        Some(viewer) => {
            let ids: Vec<Uuid> = page.iter().map(|u| u.id).collect();
            match subscriptions::table
                .filter(subscriptions::user_id.eq(viewer.id))
                .filter(subscriptions::author_id.eq_any(&ids))
                .select(subscriptions::author_id)
                .load::<Uuid>(&mut conn)
            {
                Ok(rows) => rows.into_iter().collect(),
                Err(e) => {
                    tracing::error!("Failed to fetch subscriptions: {}", e);
                    HashSet::new()
                }
            }
        }
        None => HashSet::new(),
    };

    let results: Vec<UserProfile> = page
        .iter()
        .map(|u| UserProfile::from_user(u, followed.contains(&u.id), &state.config))
        .collect();

    (
        StatusCode::OK,
        Json(Paginated::new(
            results,
            count,
            &params,
            &state.config.base_url,
            "/api/users",
        )),
    )
        .into_response()
}
