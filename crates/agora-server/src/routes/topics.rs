use agora_api_types::topics::CreateTopic;
use agora_error::ApiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::morphers::IntoApiTopic;
use crate::extract::{Json, SessionUser};
use crate::{services, App};

pub async fn list(app: App) -> Result<Response, ApiError> {
    let topics = services::topics::ListTopics.perform(&app).await?;
    let response = topics
        .into_iter()
        .map(IntoApiTopic::into_api_topic)
        .collect::<Vec<_>>();

    Ok(Json(response).into_response())
}

pub async fn create(
    app: App,
    _session_user: SessionUser,
    Json(form): Json<CreateTopic>,
) -> Result<Response, ApiError> {
    let request = services::topics::CreateTopic { name: &form.name };
    let topic = request.perform(&app).await?;

    Ok((StatusCode::CREATED, Json(topic.into_api_topic())).into_response())
}
