use agora_api_types::users::{AuthInput, LoginResponse};
use agora_error::ApiError;
use agora_model::id::UserId;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::morphers::IntoApiUser;
use crate::extract::{Json, SessionUser};
use crate::{services, App};

pub async fn register(app: App, Json(form): Json<AuthInput>) -> Result<Response, ApiError> {
    let request = services::users::Register {
        name: &form.name,
        password: &form.password,
    };

    let authenticated = request.perform(&app).await?;
    let response = Json(LoginResponse {
        user: authenticated.user.into_api_user(),
        token: authenticated.token,
    });

    Ok((StatusCode::CREATED, response).into_response())
}

pub async fn login(app: App, Json(form): Json<AuthInput>) -> Result<Response, ApiError> {
    let request = services::users::Login {
        name: &form.name,
        password: &form.password,
    };

    let authenticated = request.perform(&app).await?;
    let response = Json(LoginResponse {
        user: authenticated.user.into_api_user(),
        token: authenticated.token,
    });

    Ok(response.into_response())
}

pub async fn local_profile(session_user: SessionUser) -> Result<Response, ApiError> {
    let user = session_user.into_inner();
    Ok(Json(user.into_api_user()).into_response())
}

pub async fn list(app: App) -> Result<Response, ApiError> {
    let users = services::users::ListUsers.perform(&app).await?;
    let response = users
        .into_iter()
        .map(IntoApiUser::into_api_user)
        .collect::<Vec<_>>();

    Ok(Json(response).into_response())
}

pub async fn get(app: App, Path(id): Path<i64>) -> Result<Response, ApiError> {
    let request = services::users::GetUser { id: UserId(id) };
    let user = request.perform(&app).await?;

    Ok(Json(user.into_api_user()).into_response())
}
