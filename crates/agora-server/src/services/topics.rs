use agora_error::ext::ResultExt;
use agora_error::{ApiError, ErrorCategory};
use agora_model::topic::InsertTopic;
use agora_model::Topic;

use crate::services::util::CommitError;
use crate::App;

pub const MAX_NAME_LENGTH: usize = 50;

#[derive(Debug)]
pub struct ListTopics;

impl ListTopics {
    #[tracing::instrument(skip(app), name = "services.topics.list")]
    pub async fn perform(self, app: &App) -> Result<Vec<Topic>, ApiError> {
        let mut conn = app.db_read().await?;
        Ok(Topic::list(&mut conn).await?)
    }
}

#[derive(Debug)]
pub struct CreateTopic<'a> {
    pub name: &'a str,
}

impl CreateTopic<'_> {
    #[tracing::instrument(skip(app), name = "services.topics.create")]
    pub async fn perform(self, app: &App) -> Result<Topic, ApiError> {
        let name = validate_name(self.name)?;

        let mut tx = app.db_write().await?;
        if Topic::check_name_taken(&mut tx, name).await? {
            return Err(
                ApiError::new(ErrorCategory::Conflict).message("Topic name is already taken")
            );
        }

        let topic = InsertTopic::builder().name(name).build().insert(&mut tx).await?;
        tx.commit().await.change_context(CommitError)?;

        Ok(topic)
    }
}

fn validate_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(
            ApiError::new(ErrorCategory::InvalidRequest).message("Topic name must not be empty")
        );
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::new(ErrorCategory::InvalidRequest).message(format!(
            "Topic name must be at most {MAX_NAME_LENGTH} characters long"
        )));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_validates_topic_names() {
        assert_eq!(validate_name(" rust ").unwrap(), "rust");

        let error = validate_name("  ").unwrap_err();
        assert_eq!(error.category, ErrorCategory::InvalidRequest);

        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        let error = validate_name(&long).unwrap_err();
        assert_eq!(error.category, ErrorCategory::InvalidRequest);
    }
}
