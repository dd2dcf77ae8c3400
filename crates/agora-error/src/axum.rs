use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::{ApiError, ErrorCategory};

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match &self.category {
            ErrorCategory::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCategory::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::AccessDenied => StatusCode::UNAUTHORIZED,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
        };
        (status_code, Json(self)).into_response()
    }
}
