use agora_error::ext::ResultExt;
use agora_error::{ApiError, ErrorCategory};
use agora_model::id::{CommentId, UserId};
use agora_model::{Comment, CommentView, CommentVote, VoteIntent};

use crate::extract::SessionUser;
use crate::services::comments::not_found;
use crate::services::util::CommitError;
use crate::App;

/// Casts, switches or clears the caller's vote on a comment and returns
/// the refreshed view.
#[derive(Debug)]
pub struct VoteComment {
    pub comment_id: CommentId,
    pub voter: UserId,
    pub intent: VoteIntent,
}

impl VoteComment {
    #[tracing::instrument(skip(app), name = "services.comments.vote")]
    pub async fn perform(self, app: &App, session: &SessionUser) -> Result<CommentView, ApiError> {
        if self.voter != session.id {
            return Err(ApiError::new(ErrorCategory::AccessDenied)
                .message("You may only cast votes as yourself"));
        }

        let mut tx = app.db_write().await?;
        if Comment::find(&mut tx, self.comment_id).await?.is_none() {
            return Err(not_found());
        }

        match self.intent {
            VoteIntent::Clear => {
                CommentVote::delete(&mut tx, self.comment_id, session.id).await?;
            }
            intent => {
                CommentVote::upsert(&mut tx, self.comment_id, session.id, intent.value()).await?;
            }
        }

        let view = CommentView::find(&mut tx, self.comment_id, Some(session.id))
            .await?
            .ok_or_else(not_found)?;

        tx.commit().await.change_context(CommitError)?;
        Ok(view)
    }
}
