mod crypto;
mod db;
mod extractor;

pub use crypto::{hash_password, hash_token, verify_password};
pub use db::{create_auth_token, get_user_from_token, revoke_token};
pub use extractor::{token_from_headers, AuthError, AuthUser, MaybeAuthUser};
