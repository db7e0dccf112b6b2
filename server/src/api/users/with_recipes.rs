use crate::api::recipes::view::RecipeMinified;
use crate::config::Config;
use crate::media;
use crate::models::{Recipe, User};
use crate::schema::recipes;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Author payload used by the subscribe action and the subscriptions list:
/// the profile fields plus the author's recipes and their total count.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithRecipes {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeMinified>,
    /// Total recipe count (not trimmed by recipes_limit)
    pub recipes_count: i64,
    pub avatar: Option<String>,
}

/// Builds the payloads for a set of followed authors with one recipe query.
/// `recipes_limit` trims each author's recipe list without affecting
/// `recipes_count`.
pub fn load_authors_with_recipes(
    conn: &mut PgConnection,
    config: &Config,
    authors: Vec<User>,
    recipes_limit: Option<i64>,
) -> QueryResult<Vec<UserWithRecipes>> {
    let author_ids: Vec<Uuid> = authors.iter().map(|a| a.id).collect();

    let recipe_rows: Vec<Recipe> = recipes::table
        .filter(recipes::author_id.eq_any(&author_ids))
        .order(recipes::created_at.desc())
        .select(Recipe::as_select())
        .load(conn)?;

    let mut by_author: HashMap<Uuid, Vec<RecipeMinified>> = HashMap::new();
    let mut counts: HashMap<Uuid, i64> = HashMap::new();
    for recipe in recipe_rows {
        *counts.entry(recipe.author_id).or_insert(0) += 1;
        by_author
            .entry(recipe.author_id)
            .or_default()
            .push(RecipeMinified::from_recipe(&recipe, config));
    }

    Ok(authors
        .into_iter()
        .map(|author| {
            let mut author_recipes = by_author.remove(&author.id).unwrap_or_default();
            if let Some(limit) = recipes_limit {
                author_recipes.truncate(limit.max(0) as usize);
            }

            UserWithRecipes {
                recipes_count: counts.get(&author.id).copied().unwrap_or(0),
                recipes: author_recipes,
                is_subscribed: true,
                avatar: author
                    .avatar_path
                    .as_deref()
                    .map(|path| media::media_url(&config.base_url, path)),
                id: author.id,
                email: author.email,
                username: author.username,
                first_name: author.first_name,
                last_name: author.last_name,
            }
        })
        .collect())
}
