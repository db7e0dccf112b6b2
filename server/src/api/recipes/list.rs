use crate::api::recipes::view::{load_recipe_responses, RecipeResponse};
use crate::api::ErrorResponse;
use crate::auth::MaybeAuthUser;
use crate::get_conn;
use crate::models::Recipe;
use crate::pagination::{PageParams, Paginated};
use crate::schema::{favorites, recipe_tags, recipes, shopping_cart_items, tags};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::Query;
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
    /// Page size (default: 6, max: 100)
    pub limit: Option<i64>,
    /// Filter by author ID
    pub author: Option<Uuid>,
    /// Filter by tag slug; repeatable, matches any of the given tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// "1" limits results to the caller's favorites (requires auth)
    pub is_favorited: Option<String>,
    /// "1" limits results to the caller's shopping cart (requires auth)
    pub is_in_shopping_cart: Option<String>,
    /// Case-insensitive substring filter on the recipe name
    pub name: Option<String>,
}

fn flag_enabled(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true"))
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Paginated list of recipes", body = Paginated<RecipeResponse>)
    )
)]
pub async fn list_recipes(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> Response {
    let page_params = PageParams {
        page: params.page,
        limit: params.limit,
    };

    let name_pattern = params
        .name
        .as_deref()
        .map(|name| format!("%{}%", name.replace('%', "\\%").replace('_', "\\_")));

    let viewer_id = viewer.as_ref().map(|v| v.id);

    // The filter set is applied twice: once for the count, once for the page
    let build_query = || {
        let mut query = recipes::table.into_boxed();

        if let Some(author) = params.author {
            query = query.filter(recipes::author_id.eq(author));
        }

        if !params.tags.is_empty() {
            let tagged = recipe_tags::table
                .inner_join(tags::table)
                .filter(tags::slug.eq_any(&params.tags))
                .select(recipe_tags::recipe_id);
            query = query.filter(recipes::id.eq_any(tagged));
        }

        if let Some(ref pattern) = name_pattern {
            query = query.filter(recipes::name.ilike(pattern));
        }

        if let Some(viewer_id) = viewer_id {
            if flag_enabled(&params.is_favorited) {
                let favorited = favorites::table
                    .filter(favorites::user_id.eq(viewer_id))
                    .select(favorites::recipe_id);
                query = query.filter(recipes::id.eq_any(favorited));
            }

            if flag_enabled(&params.is_in_shopping_cart) {
                let in_cart = shopping_cart_items::table
                    .filter(shopping_cart_items::user_id.eq(viewer_id))
                    .select(shopping_cart_items::recipe_id);
                query = query.filter(recipes::id.eq_any(in_cart));
            }
        }

        query
    };

    let mut conn = get_conn!(state.pool);

    let count: i64 = match build_query().count().get_result(&mut conn) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to count recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let page: Vec<Recipe> = match build_query()
        .order(recipes::created_at.desc())
        .limit(page_params.limit())
        .offset(page_params.offset())
        .select(Recipe::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let results = match load_recipe_responses(&mut conn, &state.config, page, viewer.as_ref()) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to hydrate recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
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
            "/api/recipes",
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_enabled() {
        assert!(flag_enabled(&Some("1".to_string())));
        assert!(flag_enabled(&Some("true".to_string())));
        assert!(!flag_enabled(&Some("0".to_string())));
        assert!(!flag_enabled(&Some("yes".to_string())));
        assert!(!flag_enabled(&None));
    }
}
