use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::Comment;
use crate::id::UserId;
use crate::user::User;

/// A comment together with its author and live vote aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub comment: Comment,
    pub author: Option<User>,
    pub net_votes: i64,
    pub user_vote: i16,
}

impl<'r> FromRow<'r, PgRow> for CommentView {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let author = row
            .try_get::<Option<UserId>, _>("u.id")?
            .map(|id| {
                Ok::<_, sqlx::Error>(User {
                    id,
                    created_at: row.try_get("u.created_at")?,
                    name: row.try_get("u.name")?,
                    password_hash: row.try_get("u.password_hash")?,
                })
            })
            .transpose()?;

        Ok(Self {
            comment: Comment {
                id: row.try_get("c.id")?,
                created_at: row.try_get("c.created_at")?,
                updated_at: row.try_get("c.updated_at")?,
                post_id: row.try_get("c.post_id")?,
                author_id: row.try_get("c.author_id")?,
                content: row.try_get("c.content")?,
            },
            author,
            net_votes: row.try_get("net_votes")?,
            user_vote: row.try_get("user_vote")?,
        })
    }
}
