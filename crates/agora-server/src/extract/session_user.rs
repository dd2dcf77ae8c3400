use agora_db::PgConnection;
use agora_error::{ApiError, ErrorCategory};
use agora_model::id::UserId;
use agora_model::User;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use std::ops::Deref;

use crate::App;

/// The authenticated caller, placed into request extensions by the
/// auth middleware. Extracting it from a request without a valid
/// bearer token fails with `access_denied`.
#[derive(Clone)]
pub struct SessionUser {
    pub user: User,
}

impl SessionUser {
    #[must_use]
    pub fn into_inner(self) -> User {
        self.user
    }

    pub(crate) async fn from_db(
        conn: &mut PgConnection,
        id: UserId,
    ) -> Result<Self, ApiError> {
        let user: Option<User> = User::find(conn, id).await?;

        // A valid token for a user that no longer exists gets denied,
        // not a 404; the token is simply not useful anymore.
        match user {
            Some(user) => Ok(Self { user }),
            None => Err(ApiError::new(ErrorCategory::AccessDenied)),
        }
    }
}

impl Deref for SessionUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl std::fmt::Debug for SessionUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionUser")
            .field("id", &self.user.id)
            .finish_non_exhaustive()
    }
}

#[axum::async_trait]
impl FromRequestParts<App> for SessionUser {
    type Rejection = Response;

    #[tracing::instrument(skip_all, name = "extractors.session_user")]
    async fn from_request_parts(parts: &mut Parts, _app: &App) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<SessionUser>() {
            Some(identity) => Ok(identity.clone()),
            None => Err(ApiError::new(ErrorCategory::AccessDenied).into_response()),
        }
    }
}

/// Like [`SessionUser`] but never rejects; listing routes use it so
/// anonymous callers still get a feed, just with zeroed `user_vote`s.
#[derive(Debug, Clone)]
pub struct MaybeSessionUser(pub Option<SessionUser>);

impl MaybeSessionUser {
    /// The viewer id handed down to the vote aggregation queries.
    #[must_use]
    pub fn viewer(&self) -> Option<UserId> {
        self.0.as_ref().map(|session| session.user.id)
    }
}

#[axum::async_trait]
impl FromRequestParts<App> for MaybeSessionUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _app: &App) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<SessionUser>().cloned()))
    }
}
