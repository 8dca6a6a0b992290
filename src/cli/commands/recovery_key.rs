//! `velano recovery-key`: generate a recovery key for offline storage.

use console::style;

use crate::cli::output;
use crate::cli::{unlock_session, Cli};
use crate::crypto::RecoveryKey;
use crate::errors::Result;

/// Execute the `recovery-key` command.
///
/// Requires unlocking so only the account owner can mint a key.  The key
/// is shown once and never written to disk.
pub fn execute(cli: &Cli) -> Result<()> {
    let _session = unlock_session(cli)?;

    let key = RecoveryKey::generate();
    println!("{}", style(key.as_str()).bold());

    output::note("Write this key down and keep it offline. It is not stored anywhere.");
    Ok(())
}
