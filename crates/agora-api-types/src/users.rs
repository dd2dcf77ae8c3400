use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Public data of a user. Credentials never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiUser {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub name: String,
}

/// Request body for `POST /users/register` and `POST /users/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthInput {
    pub name: String,
    pub password: String,
}

/// Response body for a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoginResponse {
    pub user: ApiUser,
    pub token: String,
}
