use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::topics::ApiTopic;
use crate::users::ApiUser;

/// This object contains the summarized data of a post as served by
/// listing and detail routes.
///
/// `net_votes` and `user_vote` are computed per request from the raw vote
/// rows; they are never persisted and never accepted back on write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiPost {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,

    pub title: String,
    pub content: String,
    pub author: Option<ApiUser>,
    #[serde(default)]
    pub topics: Vec<ApiTopic>,

    /// Sum of all vote values for this post.
    pub net_votes: i64,
    /// The requesting caller's own vote (`0` if none or anonymous).
    pub user_vote: i16,
}

/// Request body for `POST /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub topic_ids: Vec<i32>,
}

/// Request body for `PATCH /posts/{post_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpdatePost {
    pub title: String,
    pub content: String,
}

/// Request body for `PUT /posts/{post_id}/topics`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplaceTags {
    pub topic_ids: Vec<i32>,
}
