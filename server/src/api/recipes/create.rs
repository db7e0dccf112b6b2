use crate::api::recipes::payload::{check_references, validate_structure, RecipePayload};
use crate::api::recipes::view::load_recipe_responses;
use crate::api::{ErrorResponse, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::get_conn;
use crate::media;
use crate::models::{NewRecipe, NewRecipeIngredient, NewRecipeTag, Recipe};
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = RecipePayload,
    responses(
        (status = 201, description = "Recipe created successfully", body = crate::api::recipes::view::RecipeResponse),
        (status = 400, description = "Invalid request", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<RecipePayload>,
) -> Response {
    if let Err(errors) = validate_structure(&payload) {
        return errors.into_response();
    }

    let image_data_url = match &payload.image {
        Some(data_url) => data_url,
        None => {
            return ValidationErrorResponse::single("image", "This field is required")
                .into_response()
        }
    };

    let mut conn = get_conn!(state.pool);

    match check_references(&mut conn, &payload) {
        Ok(None) => {}
        Ok(Some(errors)) => return errors.into_response(),
        Err(e) => {
            tracing::error!("Failed to validate recipe references: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    let image_path = match media::store_image(&state.config.media_root, "recipes", image_data_url)
    {
        Ok(path) => path,
        Err(e) => {
            return ValidationErrorResponse::single("image", e.to_string()).into_response();
        }
    };

    // Recipe row plus its tag and ingredient links land atomically
    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(NewRecipe {
                author_id: user.id,
                name: payload.name.trim(),
                text: &payload.text,
                image_path: &image_path,
                cooking_time: payload.cooking_time.unwrap_or_default(),
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        let tag_links: Vec<NewRecipeTag> = payload
            .tags
            .iter()
            .map(|tag_id| NewRecipeTag {
                recipe_id: recipe.id,
                tag_id: *tag_id,
            })
            .collect();
        diesel::insert_into(recipe_tags::table)
            .values(&tag_links)
            .execute(conn)?;

        let ingredient_links: Vec<NewRecipeIngredient> = payload
            .ingredients
            .iter()
            .map(|line| NewRecipeIngredient {
                recipe_id: recipe.id,
                ingredient_id: line.id,
                amount: line.amount,
            })
            .collect();
        diesel::insert_into(recipe_ingredients::table)
            .values(&ingredient_links)
            .execute(conn)?;

        Ok(recipe)
    });

    let recipe = match result {
        Ok(recipe) => recipe,
        Err(e) => {
            // The row never landed, so the stored file must not survive
            media::remove_image(&state.config.media_root, &image_path);

            if let diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) = e
            {
                return ValidationErrorResponse::single(
                    "name",
                    "You already have a recipe with this name",
                )
                .into_response();
            }

            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match load_recipe_responses(&mut conn, &state.config, vec![recipe], Some(&user)) {
        Ok(mut responses) if !responses.is_empty() => {
            (StatusCode::CREATED, Json(responses.remove(0))).into_response()
        }
        Ok(_) | Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to load created recipe".to_string(),
            }),
        )
            .into_response(),
    }
}
