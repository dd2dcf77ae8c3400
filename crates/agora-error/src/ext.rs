//! Re-exports of the report-manipulation traits used across the workspace,
//! so downstream crates only pull in `agora_error`.

pub use error_stack::{Report, ResultExt};
