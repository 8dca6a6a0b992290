//! `velano add`: add an item to the vault.

use crate::cli::output;
use crate::cli::{load_settings, parse_kind, read_item_secret, unlock_session, Cli, ItemFields};
use crate::crypto::generate_password;
use crate::errors::Result;
use crate::vault::ItemDraft;

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    title: &str,
    kind: &str,
    favorite: bool,
    fields: &ItemFields,
) -> Result<()> {
    let kind = parse_kind(kind)?;

    // Password source: generated, piped on stdin, or prompted.
    let password = if fields.generate {
        let options = load_settings(cli)?.password_options();
        generate_password(&options)?
    } else {
        read_item_secret(&format!("Password for '{title}' (empty for none)"))?
    };

    let mut session = unlock_session(cli)?;

    let draft = ItemDraft {
        kind,
        title: title.to_string(),
        username: fields.username.clone().unwrap_or_default(),
        password: password.to_string(),
        url: fields.url.clone().unwrap_or_default(),
        notes: fields.notes.clone().unwrap_or_default(),
        category: fields.category.clone().unwrap_or_default(),
        tags: fields.tags.clone(),
        favorite,
    };
    let id = session.add_item(draft)?;
    let total = session.vault()?.len();

    output::success(&format!("Added {kind} '{}' [{id}] ({total} total)", title.trim()));
    if fields.generate {
        output::tip("Run `velano show <ID> --reveal` to see the generated password.");
    }

    Ok(())
}
