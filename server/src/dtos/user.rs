//! User DTOs

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap();
}

/// DTO to create a new user (no id, the repository assigns it)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(
        length(min = 3, max = 32, message = "Username must be between 3 and 32 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may only contain letters, digits, '_', '.' and '-'")
    )]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
}

/// DTO to rename an existing user
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateUsernameDTO {
    #[validate(
        length(min = 3, max = 32, message = "Username must be between 3 and 32 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may only contain letters, digits, '_', '.' and '-'")
    )]
    pub username: String,
}
