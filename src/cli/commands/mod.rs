//! One module per subcommand.

pub mod add;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod favorite;
pub mod generate;
pub mod init;
pub mod list;
pub mod passwd;
pub mod recovery_key;
pub mod show;
