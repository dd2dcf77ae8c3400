//! Wire-level types shared between the Agora server and its clients.
//!
//! Everything here is plain data: request bodies, query parameters and
//! response shapes. Derived listing fields (`net_votes`, `user_vote`) only
//! appear on response objects and are never accepted on write.

pub mod comments;
pub mod posts;
pub mod topics;
pub mod users;
pub mod votes;

mod pagination;
mod sensitive;

pub use self::pagination::{ListQuery, Paginated};
pub use self::sensitive::Sensitive;
