//! `velano edit`: change fields of an existing item.
//!
//! Only the fields passed on the command line change; tags given with
//! `--tag` replace the item's whole tag list.

use crate::cli::output;
use crate::cli::{load_settings, parse_kind, read_item_secret, unlock_session, Cli, ItemFields};
use crate::crypto::generate_password;
use crate::errors::{Result, VaultError};
use crate::vault::ItemUpdate;

/// Execute the `edit` command.
pub fn execute(
    cli: &Cli,
    id: &str,
    title: Option<&str>,
    kind: Option<&str>,
    prompt_password: bool,
    fields: &ItemFields,
) -> Result<()> {
    let password = if fields.generate {
        let options = load_settings(cli)?.password_options();
        Some(generate_password(&options)?.to_string())
    } else if prompt_password {
        Some(read_item_secret("New item password")?.to_string())
    } else {
        None
    };

    let update = ItemUpdate {
        kind: kind.map(parse_kind).transpose()?,
        title: title.map(str::to_string),
        username: fields.username.clone(),
        password,
        url: fields.url.clone(),
        notes: fields.notes.clone(),
        category: fields.category.clone(),
        tags: (!fields.tags.is_empty()).then(|| fields.tags.clone()),
        favorite: None,
    };
    if update.is_empty() {
        return Err(VaultError::CommandFailed(
            "nothing to change: pass at least one field to edit".into(),
        ));
    }

    let mut session = unlock_session(cli)?;
    let item_id = session.vault()?.find_by_prefix(id)?.id();
    session.update_item(item_id, &update)?;

    let title = &session.item(item_id)?.title;
    output::success(&format!("Updated '{title}'"));

    Ok(())
}
