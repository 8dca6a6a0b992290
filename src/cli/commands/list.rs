//! `velano list`: display items in a table.

use crate::cli::output;
use crate::cli::{parse_kind, unlock_session, Cli};
use crate::errors::Result;
use crate::vault::ItemFilter;

/// Execute the `list` command.
pub fn execute(cli: &Cli, kind: Option<&str>, favorites: bool, query: Option<&str>) -> Result<()> {
    let filter = ItemFilter {
        kind: kind.map(parse_kind).transpose()?,
        favorites_only: favorites,
        query: query.map(str::to_string),
    };

    let session = unlock_session(cli)?;
    let vault = session.vault()?;
    let items = vault.filter(&filter);

    output::info(&format!("{} of {} item(s)", items.len(), vault.len()));
    output::print_items_table(&items);

    Ok(())
}
