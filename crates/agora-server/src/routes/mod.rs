use agora_error::{ApiError, ErrorCategory};
use axum::http::{Method, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;

use crate::middleware::auth::catch_token;
use crate::App;

mod comments;
mod morphers;
mod posts;
mod topics;
mod users;

/// Builds an [axum router] with every route the Agora API serves.
///
/// [axum router]: axum::Router
pub fn build_axum_router(app: App) -> Router {
    let api = Router::new()
        .route("/posts", get(self::posts::list).post(self::posts::publish))
        .route(
            "/posts/:id",
            get(self::posts::get)
                .patch(self::posts::update)
                .delete(self::posts::remove),
        )
        .route("/posts/:id/topics", put(self::posts::replace_topics))
        .route(
            "/posts/:id/votes/:user_id",
            put(self::posts::vote).delete(self::posts::unvote),
        )
        .route("/posts/:id/comments", get(self::comments::list))
        .route("/comments", post(self::comments::publish))
        .route(
            "/comments/:id",
            get(self::comments::get)
                .patch(self::comments::update)
                .delete(self::comments::remove),
        )
        .route(
            "/comments/:id/votes/:user_id",
            put(self::comments::vote).delete(self::comments::unvote),
        )
        .route("/topics", get(self::topics::list).post(self::topics::create))
        .route("/users", get(self::users::list))
        .route("/users/@me", get(self::users::local_profile))
        .route("/users/login", post(self::users::login))
        .route("/users/register", post(self::users::register))
        .route("/users/:id", get(self::users::get))
        .layer(from_fn_with_state(app.clone(), catch_token))
        .with_state(app);

    Router::new()
        .nest("/api", api)
        .method_not_allowed_fallback(method_not_allowed_route)
        .fallback(not_found_route)
}

async fn method_not_allowed_route() -> Response {
    ApiError::new(ErrorCategory::InvalidRequest).into_response()
}

async fn not_found_route(method: Method) -> Response {
    match method {
        Method::HEAD => StatusCode::NOT_FOUND.into_response(),
        _ => ApiError::new(ErrorCategory::NotFound).into_response(),
    }
}
