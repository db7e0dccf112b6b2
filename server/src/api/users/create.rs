use crate::api::{ErrorResponse, ValidationErrorResponse};
use crate::auth::hash_password;
use crate::constants::{
    EMAIL_LIMIT, FIRST_NAME_LIMIT, LAST_NAME_LIMIT, PASSWORD_MIN_LEN, USERNAME_LIMIT, USERNAME_RE,
};
use crate::get_conn;
use crate::models::{NewUser, User};
use crate::schema::users;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignupResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

pub fn validate_signup(req: &SignupRequest) -> Result<(), ValidationErrorResponse> {
    let mut errors = ValidationErrorResponse::default();

    if req.email.trim().is_empty() || !req.email.contains('@') {
        errors.push("email", "Enter a valid email address");
    } else if req.email.len() > EMAIL_LIMIT {
        errors.push(
            "email",
            format!("Email must be at most {} characters", EMAIL_LIMIT),
        );
    }

    if req.username.is_empty() {
        errors.push("username", "Username cannot be empty");
    } else if req.username.len() > USERNAME_LIMIT {
        errors.push(
            "username",
            format!("Username must be at most {} characters", USERNAME_LIMIT),
        );
    } else if !USERNAME_RE.is_match(&req.username) {
        errors.push(
            "username",
            "Username may contain only letters, digits and @/./+/-/_",
        );
    }

    if req.first_name.trim().is_empty() {
        errors.push("first_name", "First name cannot be empty");
    } else if req.first_name.len() > FIRST_NAME_LIMIT {
        errors.push(
            "first_name",
            format!("First name must be at most {} characters", FIRST_NAME_LIMIT),
        );
    }

    if req.last_name.trim().is_empty() {
        errors.push("last_name", "Last name cannot be empty");
    } else if req.last_name.len() > LAST_NAME_LIMIT {
        errors.push(
            "last_name",
            format!("Last name must be at most {} characters", LAST_NAME_LIMIT),
        );
    }

    if req.password.len() < PASSWORD_MIN_LEN {
        errors.push(
            "password",
            format!("Password must be at least {} characters", PASSWORD_MIN_LEN),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = SignupResponse),
        (status = 400, description = "Invalid request", body = ValidationErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Response {
    if let Err(errors) = validate_signup(&req) {
        return errors.into_response();
    }

    let mut conn = get_conn!(state.pool);

    let password_hash = match hash_password(&req.password) {
        Ok(h) => h,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to hash password".to_string(),
                }),
            )
                .into_response()
        }
    };

    let new_user = NewUser {
        email: &req.email,
        username: &req.username,
        first_name: &req.first_name,
        last_name: &req.last_name,
        password_hash: &password_hash,
    };

    let user: User = match diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(&mut conn)
    {
        Ok(u) => u,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            info,
        )) => {
            let field = match info.constraint_name() {
                Some(name) if name.contains("email") => "email",
                _ => "username",
            };
            return ValidationErrorResponse::single(
                field,
                format!("A user with this {} already exists", field),
            )
            .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create user".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SignupRequest {
        SignupRequest {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "secret-password".to_string(),
        }
    }

    #[test]
    fn test_valid_signup_passes() {
        assert!(validate_signup(&valid_request()).is_ok());
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut req = valid_request();
        req.email = "not-an-email".to_string();
        let errors = validate_signup(&req).unwrap_err();
        assert!(errors.errors.contains_key("email"));
    }

    #[test]
    fn test_bad_username_charset_is_rejected() {
        let mut req = valid_request();
        req.username = "ada lovelace".to_string();
        let errors = validate_signup(&req).unwrap_err();
        assert!(errors.errors.contains_key("username"));
    }

    #[test]
    fn test_short_password_is_rejected() {
        let mut req = valid_request();
        req.password = "short".to_string();
        let errors = validate_signup(&req).unwrap_err();
        assert!(errors.errors.contains_key("password"));
    }

    #[test]
    fn test_multiple_failures_are_all_reported() {
        let req = SignupRequest {
            email: String::new(),
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password: String::new(),
        };
        let errors = validate_signup(&req).unwrap_err();
        assert_eq!(errors.errors.len(), 5);
    }
}
