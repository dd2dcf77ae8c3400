use serde::{Deserialize, Serialize};

/// Request body for `PUT /{posts,comments}/{id}/votes/{user_id}`.
///
/// `1` casts an upvote, `-1` a downvote and `0` clears the caller's vote;
/// anything else is rejected. Clearing via `0` and the dedicated DELETE
/// route converge on the same store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CastVote {
    pub value: i16,
}
