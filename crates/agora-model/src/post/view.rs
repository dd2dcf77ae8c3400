use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::Post;
use crate::id::UserId;
use crate::user::User;

/// A post together with its author and live vote aggregates.
///
/// Aggregates are computed from the vote rows at query time; nothing is
/// cached, so a view is always consistent with the votes table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post: Post,
    pub author: Option<User>,
    /// Sum of every vote on the post; zero when nobody voted.
    pub net_votes: i64,
    /// The viewer's own vote; zero when absent or anonymous.
    pub user_vote: i16,
}

impl<'r> FromRow<'r, PgRow> for PostView {
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
            post: Post {
                id: row.try_get("p.id")?,
                created_at: row.try_get("p.created_at")?,
                updated_at: row.try_get("p.updated_at")?,
                author_id: row.try_get("p.author_id")?,
                title: row.try_get("p.title")?,
                content: row.try_get("p.content")?,
            },
            author,
            net_votes: row.try_get("net_votes")?,
            user_vote: row.try_get("user_vote")?,
        })
    }
}
