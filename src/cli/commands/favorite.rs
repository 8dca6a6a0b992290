//! `velano favorite`: toggle an item's favorite flag.

use crate::cli::output;
use crate::cli::{unlock_session, Cli};
use crate::errors::Result;

/// Execute the `favorite` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let mut session = unlock_session(cli)?;
    let item = session.vault()?.find_by_prefix(id)?;
    let (item_id, title) = (item.id(), item.title.clone());

    if session.toggle_favorite(item_id)? {
        output::success(&format!("'{title}' marked as favorite"));
    } else {
        output::success(&format!("'{title}' is no longer a favorite"));
    }
    Ok(())
}
