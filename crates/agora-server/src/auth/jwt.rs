use agora_error::{ApiError, ErrorCategory};
use agora_model::User;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::App;

static JWT_LOGIN_ISSUER: &str = "agora.api.login";

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginClaims {
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
    pub sub: i64,

    pub name: String,
}

impl LoginClaims {
    pub fn generate(user: &User) -> Self {
        let now = Utc::now();
        Self {
            nbf: now.timestamp(),
            exp: (now + TimeDelta::days(1)).timestamp(),
            iss: JWT_LOGIN_ISSUER.to_string(),
            sub: user.id.0,

            name: user.name.clone(),
        }
    }

    pub fn encode(&self, app: &App) -> Result<String, ApiError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), self, &app.jwt_encode).map_err(
            |error| {
                error!(%error, "could not encode login token");
                ApiError::unknown()
            },
        )
    }

    pub fn decode(app: &App, token: &str) -> Result<Self, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[JWT_LOGIN_ISSUER]);

        match jsonwebtoken::decode::<Self>(token.trim(), &app.jwt_decode, &validation) {
            Ok(data) => Ok(data.claims),
            // Every flavor of "this token is not yours or not valid
            // anymore" collapses into the same denial; the kind is not
            // worth leaking to the caller.
            Err(error) => match error.kind() {
                ErrorKind::Base64(..)
                | ErrorKind::ExpiredSignature
                | ErrorKind::ImmatureSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidSignature
                | ErrorKind::InvalidToken
                | ErrorKind::Json(..) => Err(ApiError::new(ErrorCategory::AccessDenied)),
                _ => {
                    error!(%error, "could not decode login token");
                    Err(ApiError::unknown())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_model::id::UserId;
    use chrono::NaiveDateTime;

    // `App::new` sets up a lazy connection pool, which wants a running
    // runtime even though these tests never touch the database.
    fn test_app() -> App {
        App::new(agora_config::Server::for_tests()).unwrap()
    }

    fn test_user() -> User {
        User {
            id: UserId(7),
            created_at: NaiveDateTime::default(),
            name: "alice".to_string(),
            password_hash: String::new(),
        }
    }

    #[tokio::test]
    async fn round_trips_claims() {
        let app = test_app();
        let token = LoginClaims::generate(&test_user()).encode(&app).unwrap();

        let claims = LoginClaims::decode(&app, &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.name, "alice");
    }

    #[tokio::test]
    async fn rejects_tokens_from_another_key() {
        let app = test_app();
        let other = test_app();

        // Each App generates its own secret when none is configured.
        let token = LoginClaims::generate(&test_user()).encode(&other).unwrap();
        let error = LoginClaims::decode(&app, &token).unwrap_err();
        assert_eq!(error.category, ErrorCategory::AccessDenied);
    }

    #[tokio::test]
    async fn rejects_garbage_tokens() {
        let app = test_app();
        let error = LoginClaims::decode(&app, "not-a-jwt").unwrap_err();
        assert_eq!(error.category, ErrorCategory::AccessDenied);
    }
}
