use bon::Builder;
use chrono::NaiveDateTime;
use sea_query::Iden;
use sqlx::FromRow;
use thiserror::Error;

use crate::id::{PostId, UserId};

mod view;
pub use self::view::PostView;

/// A top-level submission. The author is nullable so deleting a user
/// account leaves their posts behind.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Post {
    pub id: PostId,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub author_id: Option<UserId>,
    pub title: String,
    pub content: String,
}

#[derive(Builder)]
pub struct InsertPost<'a> {
    pub author_id: UserId,
    pub title: &'a str,
    pub content: &'a str,
}

#[derive(Builder)]
pub struct EditPost<'a> {
    pub id: PostId,
    pub new_title: &'a str,
    pub new_content: &'a str,
}

#[derive(Debug, Error)]
#[error("Could not insert post")]
pub struct InsertPostError;

#[derive(Debug, Error)]
#[error("Could not edit post")]
pub struct EditPostError;

#[derive(Debug, Error)]
#[error("Could not delete post")]
pub struct DeletePostError;

#[derive(Debug, Error)]
#[error("Could not replace post topics")]
pub struct ReplaceTopicsError;

#[derive(Debug, Clone, Copy, Iden)]
pub(crate) enum PostIdent {
    Posts,
    Id,
    CreatedAt,
    UpdatedAt,
    AuthorId,
    Title,
    Content,
}

impl Post {
    pub(crate) fn view_columns<A: Iden + Clone + 'static>(alias: A) -> Vec<(A, PostIdent)> {
        [
            PostIdent::Id,
            PostIdent::CreatedAt,
            PostIdent::UpdatedAt,
            PostIdent::AuthorId,
            PostIdent::Title,
            PostIdent::Content,
        ]
        .into_iter()
        .map(|column| (alias.clone(), column))
        .collect()
    }
}
