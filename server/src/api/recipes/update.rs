use crate::api::recipes::payload::{check_references, validate_structure, RecipePayload};
use crate::api::recipes::view::{load_recipe_responses, RecipeResponse};
use crate::api::{ErrorResponse, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::get_conn;
use crate::media;
use crate::models::{NewRecipeIngredient, NewRecipeTag, Recipe};
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = RecipePayload,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the recipe author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("token_auth" = []))
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipePayload>,
) -> Response {
    if let Err(errors) = validate_structure(&payload) {
        return errors.into_response();
    }

    let mut conn = get_conn!(state.pool);

    let existing: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if existing.author_id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only the author can modify this recipe".to_string(),
            }),
        )
            .into_response();
    }

    match check_references(&mut conn, &payload) {
        Ok(None) => {}
        Ok(Some(errors)) => return errors.into_response(),
        Err(e) => {
            tracing::error!("Failed to validate recipe references: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    // A new image lands on disk before the transaction; the old file is
    // only removed once the new row state is committed.
    let new_image_path = match &payload.image {
        Some(data_url) => {
            match media::store_image(&state.config.media_root, "recipes", data_url) {
                Ok(path) => Some(path),
                Err(e) => {
                    return ValidationErrorResponse::single("image", e.to_string())
                        .into_response();
                }
            }
        }
        None => None,
    };

    let image_path = new_image_path
        .clone()
        .unwrap_or_else(|| existing.image_path.clone());

    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let recipe: Recipe = diesel::update(recipes::table.find(existing.id))
            .set((
                recipes::name.eq(payload.name.trim()),
                recipes::text.eq(&payload.text),
                recipes::image_path.eq(&image_path),
                recipes::cooking_time.eq(payload.cooking_time.unwrap_or_default()),
                recipes::updated_at.eq(Utc::now()),
            ))
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        // Tag and ingredient links are replaced wholesale
        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe.id)))
            .execute(conn)?;
        diesel::delete(
            recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe.id)),
        )
        .execute(conn)?;

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
        Ok(recipe) => {
            if new_image_path.is_some() {
                media::remove_image(&state.config.media_root, &existing.image_path);
            }
            recipe
        }
        Err(e) => {
            if let Some(path) = &new_image_path {
                media::remove_image(&state.config.media_root, path);
            }

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

            tracing::error!("Failed to update recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match load_recipe_responses(&mut conn, &state.config, vec![recipe], Some(&user)) {
        Ok(mut responses) if !responses.is_empty() => {
            (StatusCode::OK, Json(responses.remove(0))).into_response()
        }
        Ok(_) | Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to load updated recipe".to_string(),
            }),
        )
            .into_response(),
    }
}
