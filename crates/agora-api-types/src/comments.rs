use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::users::ApiUser;

/// Summarized data of a comment, with the same derived vote fields
/// as [`ApiPost`](crate::posts::ApiPost).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiComment {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,

    pub post_id: i64,
    pub content: String,
    pub author: Option<ApiUser>,

    pub net_votes: i64,
    pub user_vote: i16,
}

/// Request body for `POST /comments`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateComment {
    pub post_id: i64,
    pub content: String,
}

/// Request body for `PATCH /comments/{comment_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpdateComment {
    pub content: String,
}
