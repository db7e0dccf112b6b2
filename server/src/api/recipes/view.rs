use crate::api::users::profile::UserProfile;
use crate::config::Config;
use crate::media;
use crate::models::{Ingredient, Recipe, Tag, User};
use crate::schema::{favorites, ingredients, recipe_ingredients, recipe_tags, shopping_cart_items, subscriptions, tags, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;
use uuid::Uuid;

/// Ingredient line as rendered inside a recipe.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientInRecipe {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Compact recipe used in favorites, cart and subscription payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeMinified {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeMinified {
    pub fn from_recipe(recipe: &Recipe, config: &Config) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: media::media_url(&config.base_url, &recipe.image_path),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Full recipe payload for list and detail endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<IngredientInRecipe>,
    /// Whether the requesting user favorited this recipe
    pub is_favorited: bool,
    /// Whether this recipe is in the requesting user's shopping cart
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hydrates full responses for a page of recipes with one query per
/// relation (tags, ingredient lines, authors, viewer flags) instead of a
/// query per recipe.
pub fn load_recipe_responses(
    conn: &mut PgConnection,
    config: &Config,
    recipes: Vec<Recipe>,
    viewer: Option<&User>,
) -> QueryResult<Vec<RecipeResponse>> {
    let recipe_ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<Uuid> = recipes.iter().map(|r| r.author_id).collect();

    let authors: HashMap<Uuid, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(User::as_select())
        .load::<User>(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut tags_by_recipe: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    let tag_rows: Vec<(Uuid, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .order(tags::name.asc())
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .load(conn)?;
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(tag);
    }

    let mut ingredients_by_recipe: HashMap<Uuid, Vec<IngredientInRecipe>> = HashMap::new();
    let ingredient_rows: Vec<(Uuid, i32, Ingredient)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order(ingredients::name.asc())
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            Ingredient::as_select(),
        ))
        .load(conn)?;
    for (recipe_id, amount, ingredient) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(IngredientInRecipe {
                id: ingredient.id,
                name: ingredient.name,
                measurement_unit: ingredient.measurement_unit,
                amount,
            });
    }

    let (favorited, in_cart, followed) = match viewer {
        Some(viewer) => {
            let favorited: HashSet<Uuid> = favorites::table
                .filter(favorites::user_id.eq(viewer.id))
                .filter(favorites::recipe_id.eq_any(&recipe_ids))
                .select(favorites::recipe_id)
                .load::<Uuid>(conn)?
                .into_iter()
                .collect();

            let in_cart: HashSet<Uuid> = shopping_cart_items::table
                .filter(shopping_cart_items::user_id.eq(viewer.id))
                .filter(shopping_cart_items::recipe_id.eq_any(&recipe_ids))
                .select(shopping_cart_items::recipe_id)
                .load::<Uuid>(conn)?
                .into_iter()
                .collect();

            let followed: HashSet<Uuid> = subscriptions::table
                .filter(subscriptions::user_id.eq(viewer.id))
                .filter(subscriptions::author_id.eq_any(&author_ids))
                .select(subscriptions::author_id)
                .load::<Uuid>(conn)?
                .into_iter()
                .collect();

            (favorited, in_cart, followed)
        }
        None => (HashSet::new(), HashSet::new(), HashSet::new()),
    };

    Ok(recipes
        .into_iter()
        .filter_map(|recipe| {
            let author = authors.get(&recipe.author_id)?;

            Some(RecipeResponse {
                id: recipe.id,
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                author: UserProfile::from_user(
                    author,
                    followed.contains(&author.id),
                    config,
                ),
                ingredients: ingredients_by_recipe
                    .remove(&recipe.id)
                    .unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                image: media::media_url(&config.base_url, &recipe.image_path),
                name: recipe.name,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
                created_at: recipe.created_at,
                updated_at: recipe.updated_at,
            })
        })
        .collect())
}
