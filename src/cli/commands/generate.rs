//! `velano generate`: print a random password or word passphrase.

use crate::cli::output;
use crate::cli::{load_settings, Cli};
use crate::crypto::{generate_passphrase, generate_password, PassphraseOptions};
use crate::errors::Result;

/// Class toggles from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassFlags {
    pub no_symbols: bool,
    pub no_numbers: bool,
    pub no_uppercase: bool,
    pub no_lowercase: bool,
}

/// Execute the `generate` command.
///
/// With `passphrase` set, prints a word passphrase and ignores the
/// character-class settings.
pub fn execute(
    cli: &Cli,
    length: Option<usize>,
    flags: ClassFlags,
    passphrase: Option<PassphraseOptions>,
) -> Result<()> {
    if let Some(options) = passphrase {
        let phrase = generate_passphrase(&options)?;
        println!("{}", phrase.as_str());
        output::note(&format!("Words: {}", options.words));
        return Ok(());
    }

    let mut options = load_settings(cli)?.password_options();
    if let Some(length) = length {
        options.length = length;
    }
    options.symbols &= !flags.no_symbols;
    options.numbers &= !flags.no_numbers;
    options.uppercase &= !flags.no_uppercase;
    options.lowercase &= !flags.no_lowercase;

    let password = generate_password(&options)?;
    println!("{}", password.as_str());

    output::note(&format!("Strength: {}/100", options.strength()));
    Ok(())
}
