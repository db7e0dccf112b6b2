use crate::config::Config;
use crate::media;
use crate::models::User;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Public representation of a user account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the requesting user follows this user (false for anonymous)
    pub is_subscribed: bool,
    /// Absolute avatar URL, if one is set
    pub avatar: Option<String>,
}

impl UserProfile {
    pub fn from_user(user: &User, is_subscribed: bool, config: &Config) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
            avatar: user
                .avatar_path
                .as_deref()
                .map(|path| media::media_url(&config.base_url, path)),
        }
    }
}
