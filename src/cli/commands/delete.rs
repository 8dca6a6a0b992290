//! `velano delete`: remove an item from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{unlock_session, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let mut session = unlock_session(cli)?;
    let item = session.vault()?.find_by_prefix(id)?;
    let (item_id, title) = (item.id(), item.title.clone());

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{title}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    session.delete_item(item_id)?;
    output::success(&format!("Deleted '{title}'"));

    Ok(())
}
