//! Field bounds shared by the API validation layer and the importer.

use regex::Regex;
use std::sync::LazyLock;

/// Allowed characters for usernames: letters, digits and @/./+/-/_.
pub static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("invalid username regex"));

pub const EMAIL_LIMIT: usize = 254;
pub const USERNAME_LIMIT: usize = 150;
pub const FIRST_NAME_LIMIT: usize = 150;
pub const LAST_NAME_LIMIT: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

pub const RECIPE_NAME_LIMIT: usize = 256;

/// Ingredient amount bounds for a single recipe line.
pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 9999;

/// Cooking time bounds in minutes. 1440 is one day.
pub const MIN_COOK_TIME: i32 = 1;
pub const MAX_COOK_TIME: i32 = 1440;

/// Default page size for paginated list endpoints.
pub const PAGE_SIZE: i64 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_re_accepts_common_names() {
        for name in ["alice", "bob.smith", "user+tag", "a_b-c", "me@host"] {
            assert!(USERNAME_RE.is_match(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_username_re_rejects_spaces_and_punctuation() {
        for name in ["has space", "semi;colon", "slash/name", ""] {
            assert!(!USERNAME_RE.is_match(name), "{name} should be invalid");
        }
    }
}
