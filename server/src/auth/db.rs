use crate::db::DbPool;
use crate::models::{NewAuthToken, User};
use crate::schema::{auth_tokens, users};
use chrono::{Duration, Utc};
use diesel::prelude::*;

use super::crypto::{generate_token, hash_token};

/// Issued tokens stay valid for 30 days.
const TOKEN_TTL_DAYS: i64 = 30;

pub fn create_auth_token(
    conn: &mut PgConnection,
    user_id: uuid::Uuid,
) -> Result<String, diesel::result::Error> {
    let token = generate_token();
    let token_hash = hash_token(&token);
    let expires_at = Utc::now() + Duration::days(TOKEN_TTL_DAYS);

    let new_token = NewAuthToken {
        user_id,
        token_hash: &token_hash,
        expires_at,
    };

    diesel::insert_into(auth_tokens::table)
        .values(&new_token)
        .execute(conn)?;

    Ok(token)
}

pub async fn get_user_from_token(pool: &DbPool, token: &str) -> Option<User> {
    let mut conn = pool.get().ok()?;
    let token_hash = hash_token(token);

    auth_tokens::table
        .inner_join(users::table)
        .filter(auth_tokens::token_hash.eq(&token_hash))
        .filter(auth_tokens::expires_at.gt(Utc::now()))
        .select(User::as_select())
        .first(&mut conn)
        .ok()
}

/// Deletes the token row for the presented token. Returns the number of
/// revoked rows (0 when the token was unknown or already revoked).
pub fn revoke_token(
    conn: &mut PgConnection,
    token: &str,
) -> Result<usize, diesel::result::Error> {
    let token_hash = hash_token(token);
    diesel::delete(auth_tokens::table.filter(auth_tokens::token_hash.eq(&token_hash)))
        .execute(conn)
}
