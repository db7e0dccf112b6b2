pub mod auth_token;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Field-keyed validation errors, returned with a 400 status. Every write
/// endpoint rejects the whole payload with one of these; no partial writes.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrorResponse {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self { errors }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Base spec with shared components and security
    #[derive(OpenApi)]
    #[openapi(components(schemas(ErrorResponse, ValidationErrorResponse)))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    // Add security scheme: `Authorization: Token <hex>`
    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "token_auth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Token-prefixed API token, e.g. `Token 0123abcd...`",
            ))),
        );
    }

    // Merge in each module's spec
    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        users::ApiDoc::openapi(),
        auth_token::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        // Merge paths
        spec.paths.paths.extend(module_spec.paths.paths);

        // Merge components (schemas)
        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_accumulates_per_field() {
        let mut errors = ValidationErrorResponse::default();
        assert!(errors.is_empty());
        errors.push("tags", "at least one tag is required");
        errors.push("tags", "duplicate tags found");
        errors.push("name", "name cannot be empty");
        assert!(!errors.is_empty());
        assert_eq!(errors.errors["tags"].len(), 2);
        assert_eq!(errors.errors["name"].len(), 1);
    }

    #[test]
    fn test_openapi_spec_builds() {
        let spec = openapi();
        assert!(spec.paths.paths.contains_key("/api/recipes"));
        assert!(spec.paths.paths.contains_key("/api/users"));
        assert!(spec
            .paths
            .paths
            .contains_key("/api/recipes/download_shopping_cart"));
    }
}
