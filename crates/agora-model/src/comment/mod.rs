use bon::Builder;
use chrono::NaiveDateTime;
use sea_query::Iden;
use sqlx::FromRow;
use thiserror::Error;

use crate::id::{CommentId, PostId, UserId};

mod view;
pub use self::view::CommentView;

/// A reply attached to a post. Deleting the post removes its comments;
/// deleting the author only orphans them.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub post_id: PostId,
    pub author_id: Option<UserId>,
    pub content: String,
}

#[derive(Builder)]
pub struct InsertComment<'a> {
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: &'a str,
}

#[derive(Builder)]
pub struct EditComment<'a> {
    pub id: CommentId,
    pub new_content: &'a str,
}

#[derive(Debug, Error)]
#[error("Could not insert comment")]
pub struct InsertCommentError;

#[derive(Debug, Error)]
#[error("Could not edit comment")]
pub struct EditCommentError;

#[derive(Debug, Error)]
#[error("Could not delete comment")]
pub struct DeleteCommentError;

#[derive(Debug, Clone, Copy, Iden)]
pub(crate) enum CommentIdent {
    Comments,
    Id,
    CreatedAt,
    UpdatedAt,
    PostId,
    AuthorId,
    Content,
}

impl Comment {
    pub(crate) fn view_columns<A: Iden + Clone + 'static>(alias: A) -> Vec<(A, CommentIdent)> {
        [
            CommentIdent::Id,
            CommentIdent::CreatedAt,
            CommentIdent::UpdatedAt,
            CommentIdent::PostId,
            CommentIdent::AuthorId,
            CommentIdent::Content,
        ]
        .into_iter()
        .map(|column| (alias.clone(), column))
        .collect()
    }
}
