//! Data model of the Agora forum and the Postgres queries behind it.

mod postgres;

pub mod comment;
pub mod error;
pub mod id;
pub mod pagination;
pub mod post;
pub mod sort;
pub mod topic;
pub mod user;
pub mod vote;

pub use self::comment::{Comment, CommentView};
pub use self::post::{Post, PostView};
pub use self::topic::Topic;
pub use self::user::User;
pub use self::vote::{CommentVote, PostVote, VoteIntent};

/// Embedded migrations; applied on server startup and by the database
/// test harness.
pub static DB_MIGRATIONS: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
