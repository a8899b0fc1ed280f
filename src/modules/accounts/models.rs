use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use shelf_authz::UserId;

/// A registered user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,
}

/// Login form as submitted; validated in the handler.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub next: Option<String>,
}

/// Signup form as submitted; validated in the handler.
#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Query string of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}
