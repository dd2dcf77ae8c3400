use agora_api_types::comments::ApiComment;
use agora_api_types::posts::ApiPost;
use agora_api_types::topics::ApiTopic;
use agora_api_types::users::ApiUser;
use agora_model::{CommentView, Topic, User};

use crate::services::posts::PostData;

pub trait IntoApiUser {
    fn into_api_user(self) -> ApiUser;
}

pub trait IntoApiTopic {
    fn into_api_topic(self) -> ApiTopic;
}

pub trait IntoApiPost {
    fn into_api_post(self) -> ApiPost;
}

pub trait IntoApiComment {
    fn into_api_comment(self) -> ApiComment;
}

impl IntoApiUser for User {
    #[must_use]
    fn into_api_user(self) -> ApiUser {
        ApiUser {
            id: self.id.0,
            created_at: self.created_at,
            name: self.name,
        }
    }
}

impl IntoApiTopic for Topic {
    #[must_use]
    fn into_api_topic(self) -> ApiTopic {
        ApiTopic {
            id: self.id.0,
            name: self.name,
        }
    }
}

impl IntoApiPost for PostData {
    #[must_use]
    fn into_api_post(self) -> ApiPost {
        let PostData { view, topics } = self;
        ApiPost {
            id: view.post.id.0,
            created_at: view.post.created_at,
            updated_at: view.post.updated_at,
            title: view.post.title,
            content: view.post.content,
            author: view.author.map(IntoApiUser::into_api_user),
            topics: topics
                .into_iter()
                .map(IntoApiTopic::into_api_topic)
                .collect(),
            net_votes: view.net_votes,
            user_vote: view.user_vote,
        }
    }
}

impl IntoApiComment for CommentView {
    #[must_use]
    fn into_api_comment(self) -> ApiComment {
        ApiComment {
            id: self.comment.id.0,
            created_at: self.comment.created_at,
            updated_at: self.comment.updated_at,
            post_id: self.comment.post_id.0,
            content: self.comment.content,
            author: self.author.map(IntoApiUser::into_api_user),
            net_votes: self.net_votes,
            user_vote: self.user_vote,
        }
    }
}
