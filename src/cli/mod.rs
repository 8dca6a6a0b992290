//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::storage::FileStorage;
use crate::vault::{ItemKind, VaultSession, VaultStatus};

/// Minimum master password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted for the master password.
pub const PASSWORD_ENV: &str = "VELANO_PASSWORD";

/// Environment variable consulted for the new password in `passwd`.
pub const NEW_PASSWORD_ENV: &str = "VELANO_NEW_PASSWORD";

/// Velano CLI: local zero-knowledge credential vault.
#[derive(Parser)]
#[command(
    name = "velano",
    about = "Local zero-knowledge credential vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding the vault store and velano.toml
    #[arg(long, env = "VELANO_DIR", default_value = ".velano", global = true)]
    pub data_dir: PathBuf,
}

/// Item fields shared by `add` and `edit`.
#[derive(clap::Args, Debug, Default)]
pub struct ItemFields {
    /// Username or account identifier
    #[arg(short, long)]
    pub username: Option<String>,

    /// Site or service URL
    #[arg(long)]
    pub url: Option<String>,

    /// Free-form notes
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Category label
    #[arg(short, long)]
    pub category: Option<String>,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Generate a random password for the item instead of prompting
    #[arg(short, long)]
    pub generate: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault account in the data directory
    Init,

    /// Add an item (password read from stdin or prompted)
    Add {
        /// Item title
        title: String,

        /// Item type: login, card, note, identity
        #[arg(short = 't', long = "type", default_value = "login")]
        kind: String,

        /// Mark the item as a favorite
        #[arg(short, long)]
        favorite: bool,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// List items, optionally filtered
    List {
        /// Only items of this type
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Only favorites
        #[arg(short, long)]
        favorites: bool,

        /// Case-insensitive search over title, username, url and tags
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show one item
    Show {
        /// Item id or unique id prefix
        id: String,

        /// Print the password in clear text
        #[arg(long)]
        reveal: bool,
    },

    /// Change fields of an item
    Edit {
        /// Item id or unique id prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New item type
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Prompt for (or read from stdin) a new item password
        #[arg(short, long)]
        password: bool,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Delete an item
    Delete {
        /// Item id or unique id prefix
        id: String,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Toggle an item's favorite flag
    Favorite {
        /// Item id or unique id prefix
        id: String,
    },

    /// Change the master password
    Passwd,

    /// Generate a recovery key to store offline
    RecoveryKey,

    /// Generate a random password, or a word passphrase with --words
    Generate {
        /// Password length (default from velano.toml, else 16)
        #[arg(short, long)]
        length: Option<usize>,

        /// Leave out symbols
        #[arg(long)]
        no_symbols: bool,

        /// Leave out digits
        #[arg(long)]
        no_numbers: bool,

        /// Leave out uppercase letters
        #[arg(long)]
        no_uppercase: bool,

        /// Leave out lowercase letters
        #[arg(long)]
        no_lowercase: bool,

        /// Generate a passphrase of this many words (3-8) instead
        #[arg(
            short,
            long,
            conflicts_with_all = ["length", "no_symbols", "no_numbers", "no_uppercase", "no_lowercase"]
        )]
        words: Option<usize>,

        /// Passphrase word separator
        #[arg(long, requires = "words", default_value = "-")]
        separator: String,

        /// Keep passphrase words in lowercase
        #[arg(long, requires = "words")]
        no_capitalize: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the master password, trying in order:
/// 1. `VELANO_PASSWORD` env var (scripts and CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// Respects `env_var` for scripted usage and enforces a minimum length.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.chars().count() < MIN_PASSWORD_LEN {
                return Err(VaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Read an item secret from piped stdin, or prompt for it on a terminal.
///
/// An empty answer is allowed; notes and identities often have no password.
pub fn read_item_secret(prompt: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(trimmed);
        return Ok(buf);
    }

    let value = dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(value))
}

/// Parse an item type argument.
pub fn parse_kind(value: &str) -> Result<ItemKind> {
    value.parse()
}

/// Load settings from the data directory.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(&cli.data_dir)
}

/// Open the session over the configured store file, without unlocking.
pub fn open_session(cli: &Cli, settings: &Settings) -> Result<VaultSession<FileStorage>> {
    let storage = FileStorage::new(settings.storage_path(&cli.data_dir));
    VaultSession::open(storage, settings.session_policy())
}

/// Open the session and unlock it with the master password.
pub fn unlock_session(cli: &Cli) -> Result<VaultSession<FileStorage>> {
    let settings = load_settings(cli)?;
    let mut session = open_session(cli, &settings)?;

    if session.status() == VaultStatus::Uninitialized {
        return Err(VaultError::NoAccount);
    }

    let password = prompt_password()?;
    session.unlock(&password)?;

    if session.needs_rekey() {
        output::tip("This vault uses an older key-derivation cost. Run `velano passwd` to upgrade it.");
    }
    Ok(session)
}
