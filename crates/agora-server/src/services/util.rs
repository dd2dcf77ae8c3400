use agora_error::{ApiError, ErrorCategory};
use agora_model::id::{TopicId, UserId};
use agora_model::sort::SortKey;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Could not commit database transaction")]
pub(crate) struct CommitError;

#[derive(Debug, Error)]
#[error("Could not join blocking task")]
pub(crate) struct JoinThreadError;

/// Missing sort means the default ordering; an unknown token is the
/// caller's mistake, not ours.
pub(crate) fn parse_sort(token: Option<&str>) -> Result<SortKey, ApiError> {
    match token {
        Some(token) => token.parse().map_err(|error: agora_model::sort::InvalidSortKey| {
            ApiError::new(ErrorCategory::InvalidRequest).message(error.to_string())
        }),
        None => Ok(SortKey::default()),
    }
}

/// Parses the `topics=1,2,3` filter. An absent or empty parameter means
/// no filtering at all, which is different from an unparsable one.
pub(crate) fn parse_topic_ids(raw: Option<&str>) -> Result<Option<Vec<TopicId>>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    if raw.trim().is_empty() {
        return Ok(None);
    }

    let mut ids = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        let id = token.parse::<i32>().ok().filter(|id| *id >= 0).ok_or_else(|| {
            ApiError::new(ErrorCategory::InvalidRequest)
                .message(format!("invalid topic id `{token}`"))
        })?;

        ids.push(TopicId(id));
    }

    Ok(Some(ids))
}

/// Edits and deletions are reserved to whoever wrote the thing.
pub(crate) fn ensure_author(author_id: Option<UserId>, caller: UserId) -> Result<(), ApiError> {
    if author_id == Some(caller) {
        Ok(())
    } else {
        Err(ApiError::new(ErrorCategory::AccessDenied)
            .message("You do not own this resource"))
    }
}
