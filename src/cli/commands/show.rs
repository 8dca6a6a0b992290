//! `velano show`: print one item.

use crate::cli::output;
use crate::cli::{unlock_session, Cli};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: &str, reveal: bool) -> Result<()> {
    let session = unlock_session(cli)?;
    let item = session.vault()?.find_by_prefix(id)?;
    output::print_item(item, reveal);
    Ok(())
}
