use crate::api::ValidationErrorResponse;
use crate::constants::{MAX_AMOUNT, MAX_COOK_TIME, MIN_AMOUNT, MIN_COOK_TIME, RECIPE_NAME_LIMIT};
use crate::schema::{ingredients, tags};
use diesel::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmount {
    /// Referenced ingredient ID
    pub id: Uuid,
    pub amount: i32,
}

/// Write payload shared by recipe create and update. All fields are
/// optional at the serde level so that missing fields surface as
/// field-keyed validation errors rather than body-rejection errors.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecipePayload {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
    /// Referenced tag IDs
    #[serde(default)]
    pub tags: Vec<Uuid>,
    /// Base64 data URL; required on create, optional on update
    pub image: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    pub cooking_time: Option<i32>,
}

/// Structural validation: everything that can be checked without touching
/// the database. Collects all failures into one field-keyed response.
pub fn validate_structure(payload: &RecipePayload) -> Result<(), ValidationErrorResponse> {
    let mut errors = ValidationErrorResponse::default();

    if payload.tags.is_empty() {
        errors.push("tags", "At least one tag is required");
    } else {
        let unique: HashSet<Uuid> = payload.tags.iter().copied().collect();
        if unique.len() != payload.tags.len() {
            errors.push("tags", "Duplicate tags found");
        }
    }

    if payload.ingredients.is_empty() {
        errors.push("ingredients", "At least one ingredient is required");
    } else {
        let unique: HashSet<Uuid> = payload.ingredients.iter().map(|i| i.id).collect();
        if unique.len() != payload.ingredients.len() {
            errors.push("ingredients", "Duplicate ingredients found");
        }

        if payload
            .ingredients
            .iter()
            .any(|i| i.amount < MIN_AMOUNT || i.amount > MAX_AMOUNT)
        {
            errors.push(
                "ingredients",
                format!(
                    "Ingredient amount must be between {} and {}",
                    MIN_AMOUNT, MAX_AMOUNT
                ),
            );
        }
    }

    if payload.name.trim().is_empty() {
        errors.push("name", "Name cannot be empty");
    } else if payload.name.len() > RECIPE_NAME_LIMIT {
        errors.push(
            "name",
            format!("Name must be at most {} characters", RECIPE_NAME_LIMIT),
        );
    }

    if payload.text.trim().is_empty() {
        errors.push("text", "Text cannot be empty");
    }

    match payload.cooking_time {
        None => errors.push("cooking_time", "This field is required"),
        Some(t) if !(MIN_COOK_TIME..=MAX_COOK_TIME).contains(&t) => {
            errors.push(
                "cooking_time",
                format!(
                    "Cooking time must be between {} and {} minutes",
                    MIN_COOK_TIME, MAX_COOK_TIME
                ),
            );
        }
        Some(_) => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Referential validation: every tag and ingredient the payload names must
/// exist. Returns `Ok(Some(errors))` when a reference is dangling.
pub fn check_references(
    conn: &mut PgConnection,
    payload: &RecipePayload,
) -> QueryResult<Option<ValidationErrorResponse>> {
    let mut errors = ValidationErrorResponse::default();

    let existing_tags: HashSet<Uuid> = tags::table
        .filter(tags::id.eq_any(&payload.tags))
        .select(tags::id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();
    let missing_tags: Vec<String> = payload
        .tags
        .iter()
        .filter(|id| !existing_tags.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !missing_tags.is_empty() {
        errors.push("tags", format!("Tags not found: {}", missing_tags.join(", ")));
    }

    let ingredient_ids: Vec<Uuid> = payload.ingredients.iter().map(|i| i.id).collect();
    let existing_ingredients: HashSet<Uuid> = ingredients::table
        .filter(ingredients::id.eq_any(&ingredient_ids))
        .select(ingredients::id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();
    let missing_ingredients: Vec<String> = ingredient_ids
        .iter()
        .filter(|id| !existing_ingredients.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !missing_ingredients.is_empty() {
        errors.push(
            "ingredients",
            format!("Ingredients not found: {}", missing_ingredients.join(", ")),
        );
    }

    Ok((!errors.is_empty()).then_some(errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> RecipePayload {
        RecipePayload {
            ingredients: vec![IngredientAmount {
                id: Uuid::new_v4(),
                amount: 200,
            }],
            tags: vec![Uuid::new_v4()],
            image: Some("data:image/png;base64,AAAA".to_string()),
            name: "Pancakes".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: Some(20),
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        assert!(validate_structure(&valid_payload()).is_ok());
    }

    #[test]
    fn test_empty_tags_rejected() {
        let mut p = valid_payload();
        p.tags.clear();
        let errors = validate_structure(&p).unwrap_err();
        assert!(errors.errors.contains_key("tags"));
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let mut p = valid_payload();
        let tag = Uuid::new_v4();
        p.tags = vec![tag, tag];
        let errors = validate_structure(&p).unwrap_err();
        assert_eq!(errors.errors["tags"], vec!["Duplicate tags found"]);
    }

    #[test]
    fn test_empty_ingredients_rejected() {
        let mut p = valid_payload();
        p.ingredients.clear();
        let errors = validate_structure(&p).unwrap_err();
        assert!(errors.errors.contains_key("ingredients"));
    }

    #[test]
    fn test_duplicate_ingredients_rejected() {
        let mut p = valid_payload();
        let id = Uuid::new_v4();
        p.ingredients = vec![
            IngredientAmount { id, amount: 1 },
            IngredientAmount { id, amount: 2 },
        ];
        let errors = validate_structure(&p).unwrap_err();
        assert_eq!(errors.errors["ingredients"], vec!["Duplicate ingredients found"]);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut p = valid_payload();
        p.ingredients[0].amount = 0;
        let errors = validate_structure(&p).unwrap_err();
        assert!(errors.errors["ingredients"][0].contains("between 1 and 9999"));
    }

    #[test]
    fn test_excessive_amount_rejected() {
        let mut p = valid_payload();
        p.ingredients[0].amount = 10_000;
        assert!(validate_structure(&p).is_err());
    }

    #[test]
    fn test_cooking_time_bounds() {
        let mut p = valid_payload();
        p.cooking_time = Some(0);
        assert!(validate_structure(&p).is_err());
        p.cooking_time = Some(1441);
        assert!(validate_structure(&p).is_err());
        p.cooking_time = Some(1440);
        assert!(validate_structure(&p).is_ok());
    }

    #[test]
    fn test_missing_cooking_time_rejected() {
        let mut p = valid_payload();
        p.cooking_time = None;
        let errors = validate_structure(&p).unwrap_err();
        assert_eq!(errors.errors["cooking_time"], vec!["This field is required"]);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut p = valid_payload();
        p.name = "   ".to_string();
        let errors = validate_structure(&p).unwrap_err();
        assert!(errors.errors.contains_key("name"));
    }

    #[test]
    fn test_all_failures_reported_together() {
        let p = RecipePayload {
            ingredients: vec![],
            tags: vec![],
            image: None,
            name: String::new(),
            text: String::new(),
            cooking_time: None,
        };
        let errors = validate_structure(&p).unwrap_err();
        for field in ["tags", "ingredients", "name", "text", "cooking_time"] {
            assert!(errors.errors.contains_key(field), "missing {field}");
        }
    }
}
