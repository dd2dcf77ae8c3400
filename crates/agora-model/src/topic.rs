use bon::Builder;
use sea_query::Iden;
use sqlx::FromRow;
use thiserror::Error;

use crate::id::TopicId;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
}

#[derive(Builder)]
pub struct InsertTopic<'a> {
    pub name: &'a str,
}

#[derive(Debug, Error)]
#[error("Could not insert topic")]
pub struct InsertTopicError;

#[derive(Debug, Clone, Copy, Iden)]
pub(crate) enum TopicIdent {
    Topics,
    Id,
    Name,
}

/// Join table between posts and topics.
#[derive(Debug, Clone, Copy, Iden)]
pub(crate) enum PostTopicIdent {
    PostTopics,
    PostId,
    TopicId,
}
