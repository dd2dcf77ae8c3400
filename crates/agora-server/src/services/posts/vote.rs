use agora_error::ext::ResultExt;
use agora_error::{ApiError, ErrorCategory};
use agora_model::id::{PostId, UserId};
use agora_model::{Post, PostVote, VoteIntent};

use crate::extract::SessionUser;
use crate::services::posts::{fetch_post_data, not_found, PostData};
use crate::services::util::CommitError;
use crate::App;

/// Casts, switches or clears the caller's vote on a post and returns
/// the refreshed view.
#[derive(Debug)]
pub struct VotePost {
    pub post_id: PostId,
    /// Who the request claims to vote as. Anything but the session user
    /// is denied; there is no voting on somebody's behalf.
    pub voter: UserId,
    pub intent: VoteIntent,
}

impl VotePost {
    #[tracing::instrument(skip(app), name = "services.posts.vote")]
    pub async fn perform(self, app: &App, session: &SessionUser) -> Result<PostData, ApiError> {
        if self.voter != session.id {
            return Err(ApiError::new(ErrorCategory::AccessDenied)
                .message("You may only cast votes as yourself"));
        }

        let mut tx = app.db_write().await?;
        if Post::find(&mut tx, self.post_id).await?.is_none() {
            return Err(not_found());
        }

        match self.intent {
            VoteIntent::Clear => {
                PostVote::delete(&mut tx, self.post_id, session.id).await?;
            }
            intent => {
                PostVote::upsert(&mut tx, self.post_id, session.id, intent.value()).await?;
            }
        }

        let data = fetch_post_data(&mut tx, self.post_id, Some(session.id))
            .await?
            .ok_or_else(not_found)?;

        tx.commit().await.change_context(CommitError)?;
        Ok(data)
    }
}
