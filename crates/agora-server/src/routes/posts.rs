use agora_api_types::posts::{CreatePost, ReplaceTags, UpdatePost};
use agora_api_types::votes::CastVote;
use agora_api_types::{ListQuery, Paginated};
use agora_error::{ApiError, ErrorCategory};
use agora_model::id::{PostId, TopicId, UserId};
use agora_model::VoteIntent;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::morphers::IntoApiPost;
use crate::extract::{Json, MaybeSessionUser, SessionUser};
use crate::{services, App};

pub async fn list(
    app: App,
    session_user: MaybeSessionUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let request = services::posts::ListPosts { query: &query };
    let listed = request.perform(&app, session_user.viewer()).await?;

    let response = Json(Paginated {
        items: listed
            .items
            .into_iter()
            .map(IntoApiPost::into_api_post)
            .collect::<Vec<_>>(),
        total: listed.total,
    });

    Ok(response.into_response())
}

pub async fn get(
    app: App,
    session_user: MaybeSessionUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let request = services::posts::GetPost { id: PostId(id) };
    let data = request.perform(&app, session_user.viewer()).await?;

    Ok(Json(data.into_api_post()).into_response())
}

pub async fn publish(
    app: App,
    session_user: SessionUser,
    Json(form): Json<CreatePost>,
) -> Result<Response, ApiError> {
    let request = services::posts::PublishPost {
        title: &form.title,
        content: &form.content,
        topic_ids: form.topic_ids.into_iter().map(TopicId).collect(),
    };

    let data = request.perform(&app, &session_user).await?;
    Ok((StatusCode::CREATED, Json(data.into_api_post())).into_response())
}

pub async fn update(
    app: App,
    session_user: SessionUser,
    Path(id): Path<i64>,
    Json(form): Json<UpdatePost>,
) -> Result<Response, ApiError> {
    let request = services::posts::UpdatePost {
        id: PostId(id),
        title: &form.title,
        content: &form.content,
    };

    let data = request.perform(&app, &session_user).await?;
    Ok(Json(data.into_api_post()).into_response())
}

pub async fn remove(
    app: App,
    session_user: SessionUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let request = services::posts::DeletePost { id: PostId(id) };
    request.perform(&app, &session_user).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn replace_topics(
    app: App,
    session_user: SessionUser,
    Path(id): Path<i64>,
    Json(form): Json<ReplaceTags>,
) -> Result<Response, ApiError> {
    let request = services::posts::ReplacePostTags {
        id: PostId(id),
        topic_ids: form.topic_ids.into_iter().map(TopicId).collect(),
    };

    let data = request.perform(&app, &session_user).await?;
    Ok(Json(data.into_api_post()).into_response())
}

pub async fn vote(
    app: App,
    session_user: SessionUser,
    Path((id, user_id)): Path<(i64, i64)>,
    Json(form): Json<CastVote>,
) -> Result<Response, ApiError> {
    let request = services::posts::VotePost {
        post_id: PostId(id),
        voter: UserId(user_id),
        intent: parse_intent(form.value)?,
    };

    let data = request.perform(&app, &session_user).await?;
    Ok(Json(data.into_api_post()).into_response())
}

pub async fn unvote(
    app: App,
    session_user: SessionUser,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    let request = services::posts::VotePost {
        post_id: PostId(id),
        voter: UserId(user_id),
        intent: VoteIntent::Clear,
    };

    let data = request.perform(&app, &session_user).await?;
    Ok(Json(data.into_api_post()).into_response())
}

pub(super) fn parse_intent(value: i16) -> Result<VoteIntent, ApiError> {
    VoteIntent::from_value(value).map_err(|error| {
        ApiError::new(ErrorCategory::InvalidRequest).message(error.to_string())
    })
}
