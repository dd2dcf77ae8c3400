use agora_error::{ApiError, ErrorCategory};
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use bytes::{BufMut, BytesMut};
use tracing::{error, warn};

/// Local version of [`axum::Json`] that reshapes body rejections into
/// the API's error schema instead of axum's plain-text defaults.
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        let mut buf = BytesMut::with_capacity(128).writer();
        match serde_json::to_writer(&mut buf, &self.0) {
            Ok(()) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                buf.into_inner().freeze(),
            )
                .into_response(),
            Err(error) => {
                error!(%error, "could not serialize response to JSON body");
                ApiError::unknown().into_response()
            }
        }
    }
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(inner) => Ok(Json(inner.0)),
            Err(error) => Err(ApiError::new(ErrorCategory::InvalidRequest)
                .message(match error {
                    JsonRejection::JsonDataError(error) => error.body_text(),
                    JsonRejection::JsonSyntaxError(error) => error.body_text(),
                    JsonRejection::MissingJsonContentType(..) => {
                        "Invalid content type".to_string()
                    }
                    JsonRejection::BytesRejection(error) => error.body_text(),
                    inner => {
                        warn!("unhandled axum::JsonRejection category: {inner:?}");
                        return Err(ApiError::unknown().into_response());
                    }
                })
                .into_response()),
        }
    }
}
