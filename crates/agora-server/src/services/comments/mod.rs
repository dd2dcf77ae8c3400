use agora_api_types::ListQuery;
use agora_error::ext::ResultExt;
use agora_error::{ApiError, ErrorCategory};
use agora_model::comment::{EditComment, InsertComment};
use agora_model::id::{CommentId, PostId, UserId};
use agora_model::pagination::Pagination;
use agora_model::{Comment, CommentView, Post};

use crate::extract::SessionUser;
use crate::services::util::{ensure_author, parse_sort, CommitError};
use crate::App;

mod vote;
pub use self::vote::VoteComment;

pub const MAX_CONTENT_LENGTH: usize = 10_000;

#[derive(Debug)]
pub struct ListedComments {
    pub items: Vec<CommentView>,
    /// Comments under the post, before pagination.
    pub total: i64,
}

#[derive(Debug)]
pub struct GetComment {
    pub id: CommentId,
}

impl GetComment {
    #[tracing::instrument(skip(app), name = "services.comments.get")]
    pub async fn perform(
        self,
        app: &App,
        viewer: Option<UserId>,
    ) -> Result<CommentView, ApiError> {
        let mut conn = app.db_read().await?;
        CommentView::find(&mut conn, self.id, viewer)
            .await?
            .ok_or_else(not_found)
    }
}

#[derive(Debug)]
pub struct ListComments<'a> {
    pub post_id: PostId,
    pub query: &'a ListQuery,
}

impl ListComments<'_> {
    #[tracing::instrument(skip(app), name = "services.comments.list")]
    pub async fn perform(
        self,
        app: &App,
        viewer: Option<UserId>,
    ) -> Result<ListedComments, ApiError> {
        let sort = parse_sort(self.query.sort.as_deref())?;
        let pagination = Pagination::new(self.query.page, self.query.limit);

        let mut conn = app.db_read().await?;
        if Post::find(&mut conn, self.post_id).await?.is_none() {
            return Err(ApiError::new(ErrorCategory::NotFound).message("Could not find post"));
        }

        let items = CommentView::list(&mut conn, self.post_id, sort, pagination, viewer).await?;
        let total = CommentView::count(&mut conn, self.post_id).await?;

        Ok(ListedComments { items, total })
    }
}

#[derive(Debug)]
pub struct PublishComment<'a> {
    pub post_id: PostId,
    pub content: &'a str,
}

impl PublishComment<'_> {
    #[tracing::instrument(skip(app), name = "services.comments.publish")]
    pub async fn perform(self, app: &App, session: &SessionUser) -> Result<CommentView, ApiError> {
        let content = validate_content(self.content)?;

        let mut tx = app.db_write().await?;
        if Post::find(&mut tx, self.post_id).await?.is_none() {
            return Err(ApiError::new(ErrorCategory::NotFound).message("Could not find post"));
        }

        let comment = InsertComment::builder()
            .post_id(self.post_id)
            .author_id(session.id)
            .content(content)
            .build()
            .insert(&mut tx)
            .await?;

        let view = CommentView::find(&mut tx, comment.id, Some(session.id))
            .await?
            .ok_or_else(not_found)?;

        tx.commit().await.change_context(CommitError)?;
        Ok(view)
    }
}

#[derive(Debug)]
pub struct UpdateComment<'a> {
    pub id: CommentId,
    pub content: &'a str,
}

impl UpdateComment<'_> {
    #[tracing::instrument(skip(app), name = "services.comments.update")]
    pub async fn perform(self, app: &App, session: &SessionUser) -> Result<CommentView, ApiError> {
        let content = validate_content(self.content)?;

        let mut tx = app.db_write().await?;
        let comment = Comment::find(&mut tx, self.id).await?.ok_or_else(not_found)?;
        ensure_author(comment.author_id, session.id)?;

        EditComment::builder()
            .id(self.id)
            .new_content(content)
            .build()
            .edit(&mut tx)
            .await?
            .ok_or_else(not_found)?;

        let view = CommentView::find(&mut tx, self.id, Some(session.id))
            .await?
            .ok_or_else(not_found)?;

        tx.commit().await.change_context(CommitError)?;
        Ok(view)
    }
}

#[derive(Debug)]
pub struct DeleteComment {
    pub id: CommentId,
}

impl DeleteComment {
    #[tracing::instrument(skip(app), name = "services.comments.delete")]
    pub async fn perform(self, app: &App, session: &SessionUser) -> Result<(), ApiError> {
        let mut tx = app.db_write().await?;
        let comment = Comment::find(&mut tx, self.id).await?.ok_or_else(not_found)?;
        ensure_author(comment.author_id, session.id)?;

        Comment::delete(&mut tx, self.id).await?;
        tx.commit().await.change_context(CommitError)?;

        Ok(())
    }
}

pub(super) fn not_found() -> ApiError {
    ApiError::new(ErrorCategory::NotFound).message("Could not find comment")
}

fn validate_content(content: &str) -> Result<&str, ApiError> {
    let content = content.trim();

    if content.is_empty() {
        return Err(
            ApiError::new(ErrorCategory::InvalidRequest).message("Content must not be empty")
        );
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(ApiError::new(ErrorCategory::InvalidRequest)
            .message(format!("Content must be at most {MAX_CONTENT_LENGTH} characters long")));
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_validates_comment_content() {
        assert_eq!(validate_content(" hi ").unwrap(), "hi");

        let error = validate_content("  ").unwrap_err();
        assert_eq!(error.category, ErrorCategory::InvalidRequest);

        let wall = "x".repeat(MAX_CONTENT_LENGTH + 1);
        let error = validate_content(&wall).unwrap_err();
        assert_eq!(error.category, ErrorCategory::InvalidRequest);
    }
}
