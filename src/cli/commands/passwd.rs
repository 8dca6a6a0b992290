//! `velano passwd`: change the master password.
//!
//! Re-derives the key under a fresh salt and the configured iteration
//! count, re-seals the vault, and writes the new record in one step.

use crate::cli::output;
use crate::cli::{
    load_settings, open_session, prompt_new_password, prompt_password, Cli, NEW_PASSWORD_ENV,
};
use crate::errors::{Result, VaultError};
use crate::vault::VaultStatus;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let mut session = open_session(cli, &settings)?;
    if session.status() == VaultStatus::Uninitialized {
        return Err(VaultError::NoAccount);
    }

    // 1. Unlock with the current password.
    let current = prompt_password()?;
    session.unlock(&current)?;

    // 2. Prompt for the new password.
    output::info("Choose your new master password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    // 3. Re-key and persist.
    session.change_password(&current, &new_password)?;

    output::success(&format!(
        "Master password changed ({} items re-encrypted, {} PBKDF2 iterations)",
        session.vault()?.len(),
        settings.default_iterations
    ));

    Ok(())
}
