use agora_api_types::comments::{CreateComment, UpdateComment};
use agora_api_types::votes::CastVote;
use agora_api_types::{ListQuery, Paginated};
use agora_error::ApiError;
use agora_model::id::{CommentId, PostId, UserId};
use agora_model::VoteIntent;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::morphers::IntoApiComment;
use super::posts::parse_intent;
use crate::extract::{Json, MaybeSessionUser, SessionUser};
use crate::{services, App};

pub async fn list(
    app: App,
    session_user: MaybeSessionUser,
    Path(post_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let request = services::comments::ListComments {
        post_id: PostId(post_id),
        query: &query,
    };
    let listed = request.perform(&app, session_user.viewer()).await?;

    let response = Json(Paginated {
        items: listed
            .items
            .into_iter()
            .map(IntoApiComment::into_api_comment)
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
    let request = services::comments::GetComment { id: CommentId(id) };
    let view = request.perform(&app, session_user.viewer()).await?;

    Ok(Json(view.into_api_comment()).into_response())
}

pub async fn publish(
    app: App,
    session_user: SessionUser,
    Json(form): Json<CreateComment>,
) -> Result<Response, ApiError> {
    let request = services::comments::PublishComment {
        post_id: PostId(form.post_id),
        content: &form.content,
    };

    let view = request.perform(&app, &session_user).await?;
    Ok((StatusCode::CREATED, Json(view.into_api_comment())).into_response())
}

pub async fn update(
    app: App,
    session_user: SessionUser,
    Path(id): Path<i64>,
    Json(form): Json<UpdateComment>,
) -> Result<Response, ApiError> {
    let request = services::comments::UpdateComment {
        id: CommentId(id),
        content: &form.content,
    };

    let view = request.perform(&app, &session_user).await?;
    Ok(Json(view.into_api_comment()).into_response())
}

pub async fn remove(
    app: App,
    session_user: SessionUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let request = services::comments::DeleteComment { id: CommentId(id) };
    request.perform(&app, &session_user).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn vote(
    app: App,
    session_user: SessionUser,
    Path((id, user_id)): Path<(i64, i64)>,
    Json(form): Json<CastVote>,
) -> Result<Response, ApiError> {
    let request = services::comments::VoteComment {
        comment_id: CommentId(id),
        voter: UserId(user_id),
        intent: parse_intent(form.value)?,
    };

    let view = request.perform(&app, &session_user).await?;
    Ok(Json(view.into_api_comment()).into_response())
}

pub async fn unvote(
    app: App,
    session_user: SessionUser,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    let request = services::comments::VoteComment {
        comment_id: CommentId(id),
        voter: UserId(user_id),
        intent: VoteIntent::Clear,
    };

    let view = request.perform(&app, &session_user).await?;
    Ok(Json(view.into_api_comment()).into_response())
}
