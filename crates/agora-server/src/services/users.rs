use agora_error::ext::ResultExt;
use agora_error::{ApiError, ErrorCategory};
use agora_model::id::UserId;
use agora_model::user::InsertUser;
use agora_model::User;
use tokio::task::spawn_blocking;

use crate::auth::{jwt::LoginClaims, password};
use crate::services::util::{CommitError, JoinThreadError};
use crate::App;

pub const MIN_NAME_LENGTH: usize = 3;
pub const MAX_NAME_LENGTH: usize = 30;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A user together with a fresh login token, as returned by both
/// registration and login.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

pub struct Register<'a> {
    pub name: &'a str,
    pub password: &'a str,
}

impl Register<'_> {
    // skip_all: the command carries a plaintext password.
    #[tracing::instrument(skip_all, name = "services.users.register")]
    pub async fn perform(self, app: &App) -> Result<AuthenticatedUser, ApiError> {
        let name = validate_name(self.name)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::new(ErrorCategory::InvalidRequest).message(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }

        let mut tx = app.db_write().await?;
        if User::check_name_taken(&mut tx, name).await? {
            return Err(
                ApiError::new(ErrorCategory::Conflict).message("Username is already taken")
            );
        }

        let password = self.password.to_string();
        let password_hash = spawn_blocking(move || password::hash(password))
            .await
            .change_context(JoinThreadError)??;

        let user = InsertUser::builder()
            .name(name)
            .password_hash(&password_hash)
            .build()
            .insert(&mut tx)
            .await?;

        tx.commit().await.change_context(CommitError)?;

        let token = LoginClaims::generate(&user).encode(app)?;
        Ok(AuthenticatedUser { user, token })
    }
}

pub struct Login<'a> {
    pub name: &'a str,
    pub password: &'a str,
}

impl Login<'_> {
    // skip_all: the command carries a plaintext password.
    #[tracing::instrument(skip_all, name = "services.users.login")]
    pub async fn perform(self, app: &App) -> Result<AuthenticatedUser, ApiError> {
        let mut conn = app.db_read().await?;

        // Whether the name or the password was wrong is deliberately
        // not revealed.
        let Some(user) = User::find_by_name(&mut conn, self.name.trim()).await? else {
            return Err(invalid_credentials());
        };

        let password = self.password.to_string();
        let password_hash = user.password_hash.clone();
        let matched = spawn_blocking(move || password::verify(password, &password_hash))
            .await
            .change_context(JoinThreadError)??;

        if !matched {
            return Err(invalid_credentials());
        }

        let token = LoginClaims::generate(&user).encode(app)?;
        Ok(AuthenticatedUser { user, token })
    }
}

#[derive(Debug)]
pub struct ListUsers;

impl ListUsers {
    #[tracing::instrument(skip(app), name = "services.users.list")]
    pub async fn perform(self, app: &App) -> Result<Vec<User>, ApiError> {
        let mut conn = app.db_read().await?;
        Ok(User::list(&mut conn).await?)
    }
}

#[derive(Debug)]
pub struct GetUser {
    pub id: UserId,
}

impl GetUser {
    #[tracing::instrument(skip(app), name = "services.users.get")]
    pub async fn perform(self, app: &App) -> Result<User, ApiError> {
        let mut conn = app.db_read().await?;
        User::find(&mut conn, self.id)
            .await?
            .ok_or_else(|| ApiError::new(ErrorCategory::NotFound).message("Could not find user"))
    }
}

fn invalid_credentials() -> ApiError {
    ApiError::new(ErrorCategory::AccessDenied).message("Invalid credentials")
}

fn validate_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();
    let length = name.chars().count();

    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        return Err(ApiError::new(ErrorCategory::InvalidRequest).message(format!(
            "Username must be between {MIN_NAME_LENGTH} and {MAX_NAME_LENGTH} characters long"
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::new(ErrorCategory::InvalidRequest)
            .message("Username may only contain letters, digits, `_` and `-`"));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_names() {
        assert_eq!(validate_name("alice").unwrap(), "alice");
        assert_eq!(validate_name(" b0b-2_ ").unwrap(), "b0b-2_");
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", "ab", "a b", "name!", &"x".repeat(MAX_NAME_LENGTH + 1)] {
            let error = validate_name(name).unwrap_err();
            assert_eq!(error.category, ErrorCategory::InvalidRequest, "{name:?}");
        }
    }
}
