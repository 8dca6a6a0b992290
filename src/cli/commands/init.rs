//! `velano init`: create a new vault account in the data directory.

use std::fs;

use crate::cli::output;
use crate::cli::{load_settings, open_session, prompt_new_password, Cli, PASSWORD_ENV};
use crate::errors::{Result, VaultError};
use crate::vault::VaultStatus;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let data_dir = &cli.data_dir;

    // 1. Create the data directory if it doesn't exist.
    if !data_dir.exists() {
        fs::create_dir_all(data_dir)?;
        output::info(&format!("Created data directory: {}", data_dir.display()));
    }

    // 2. Refuse to overwrite an existing account.
    let settings = load_settings(cli)?;
    let mut session = open_session(cli, &settings)?;
    if session.status() != VaultStatus::Uninitialized {
        output::tip("Use `velano add` to add items to the existing vault.");
        return Err(VaultError::AccountExists);
    }

    // 3. Prompt for the master password (with confirmation) and create.
    let password = prompt_new_password(PASSWORD_ENV)?;
    session.create_account(&password)?;

    output::success(&format!(
        "Vault created at {}",
        settings.storage_path(data_dir).display()
    ));
    output::tip("Run `velano recovery-key` and keep the key somewhere offline.");
    output::tip("Run `velano add <TITLE>` to add your first item.");

    Ok(())
}
