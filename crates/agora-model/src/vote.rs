use sea_query::Iden;
use sqlx::FromRow;
use thiserror::Error;

use crate::id::{CommentId, PostId, UserId};

/// What a caller wants their vote on a target to become.
///
/// The wire protocol carries a bare integer; this is its parsed form so
/// the rest of the crate never branches on magic numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteIntent {
    Upvote,
    Downvote,
    /// Withdraw the vote entirely. Stored as the absence of a row, not
    /// as a zero-valued one.
    Clear,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("vote value must be -1, 0 or 1, got {0}")]
pub struct InvalidVoteValue(pub i16);

impl VoteIntent {
    pub fn from_value(value: i16) -> Result<Self, InvalidVoteValue> {
        match value {
            1 => Ok(Self::Upvote),
            -1 => Ok(Self::Downvote),
            0 => Ok(Self::Clear),
            other => Err(InvalidVoteValue(other)),
        }
    }

    #[must_use]
    pub fn value(&self) -> i16 {
        match self {
            Self::Upvote => 1,
            Self::Downvote => -1,
            Self::Clear => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct PostVote {
    pub post_id: PostId,
    pub user_id: UserId,
    pub value: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct CommentVote {
    pub comment_id: CommentId,
    pub user_id: UserId,
    pub value: i16,
}

#[derive(Debug, Error)]
#[error("Could not upsert vote")]
pub struct UpsertVoteError;

#[derive(Debug, Error)]
#[error("Could not delete vote")]
pub struct DeleteVoteError;

#[derive(Debug, Clone, Copy, Iden)]
pub(crate) enum PostVoteIdent {
    PostVotes,
    PostId,
    UserId,
    Value,
}

#[derive(Debug, Clone, Copy, Iden)]
pub(crate) enum CommentVoteIdent {
    CommentVotes,
    CommentId,
    UserId,
    Value,
}

#[cfg(test)]
mod tests {
    use super::{InvalidVoteValue, VoteIntent};

    #[test]
    fn parses_the_wire_values() {
        assert_eq!(VoteIntent::from_value(1), Ok(VoteIntent::Upvote));
        assert_eq!(VoteIntent::from_value(-1), Ok(VoteIntent::Downvote));
        assert_eq!(VoteIntent::from_value(0), Ok(VoteIntent::Clear));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(VoteIntent::from_value(2), Err(InvalidVoteValue(2)));
        assert_eq!(VoteIntent::from_value(-5), Err(InvalidVoteValue(-5)));
    }

    #[test]
    fn round_trips_through_value() {
        for intent in [VoteIntent::Upvote, VoteIntent::Downvote, VoteIntent::Clear] {
            assert_eq!(VoteIntent::from_value(intent.value()), Ok(intent));
        }
    }
}
