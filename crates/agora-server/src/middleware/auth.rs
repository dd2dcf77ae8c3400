use agora_error::ApiError;
use agora_model::id::UserId;
use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::auth::jwt::LoginClaims;
use crate::extract::SessionUser;
use crate::App;

#[doc(hidden)]
#[derive(FromRequestParts)]
pub struct Metadata {
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
}

/// Resolves a bearer token into a [`SessionUser`] request extension.
///
/// Requests without an `Authorization` header pass through untouched;
/// the extractors downstream decide whether that is acceptable. A
/// header that is present but invalid fails the request here.
#[tracing::instrument(skip_all, name = "middleware.auth")]
pub async fn catch_token(
    metadata: Metadata,
    State(app): State<App>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(header) = metadata.auth_header {
        match authorize(&app, header.token()).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(error) => return error.into_response(),
        }
    }
    next.run(request).await
}

async fn authorize(app: &App, token: &str) -> Result<SessionUser, ApiError> {
    let claims = LoginClaims::decode(app, token)?;

    let mut conn = app.db_read().await?;
    SessionUser::from_db(&mut conn, UserId(claims.sub)).await
}
