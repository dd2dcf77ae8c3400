mod app;

pub mod auth;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod telemetry;

pub use self::app::App;
pub use self::routes::build_axum_router;
