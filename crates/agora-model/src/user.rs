use bon::Builder;
use chrono::NaiveDateTime;
use sea_query::Iden;
use sqlx::FromRow;
use thiserror::Error;

use crate::id::UserId;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: UserId,
    pub created_at: NaiveDateTime,
    pub name: String,
    pub password_hash: String,
}

#[derive(Builder)]
pub struct InsertUser<'a> {
    pub name: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Error)]
#[error("Could not insert user")]
pub struct InsertUserError;

#[derive(Debug, Clone, Copy, Iden)]
pub(crate) enum UserIdent {
    Users,
    Id,
    CreatedAt,
    Name,
    PasswordHash,
}

impl User {
    pub(crate) fn view_columns<A: Iden + Clone + 'static>(alias: A) -> Vec<(A, UserIdent)> {
        [
            UserIdent::Id,
            UserIdent::CreatedAt,
            UserIdent::Name,
            UserIdent::PasswordHash,
        ]
        .into_iter()
        .map(|column| (alias.clone(), column))
        .collect()
    }
}
