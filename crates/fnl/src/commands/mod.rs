//! Command handlers for the `fnl` CLI, one module per subcommand.

pub mod board;
pub mod call;
pub mod convert;
pub mod create;
pub mod delete;
pub mod due;
pub mod init;
pub mod list;
pub mod mark_sent;
pub mod move_cmd;
pub mod rule;
pub mod show;
pub mod stale;
pub mod version;
