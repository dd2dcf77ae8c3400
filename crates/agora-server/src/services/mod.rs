pub mod comments;
pub mod posts;
pub mod topics;
pub mod users;

pub(crate) mod util;
