//! Random password and passphrase generator.
//!
//! Characters are drawn uniformly from the union of the enabled classes
//! using the thread-local CSPRNG, and every enabled class is guaranteed to
//! appear at least once.  Passphrases draw whole words from a fixed list
//! and end in a random digit.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Shortest password the generator will produce.
pub const MIN_LENGTH: usize = 4;

/// Longest password the generator will produce.
pub const MAX_LENGTH: usize = 128;

/// Fewest words in a passphrase.
pub const MIN_WORDS: usize = 3;

/// Most words in a passphrase.
pub const MAX_WORDS: usize = 8;

const WORDS: &[&str] = &[
    "correct", "horse", "battery", "staple", "blue", "sky", "mountain", "river", "coffee",
    "pixel", "rocket", "lunar", "solar", "orbit", "galaxy", "comet", "furious", "calm",
    "gentle", "brave", "silent", "ancient", "future", "neon", "cyber", "secure", "vault",
    "crypto", "block", "chain", "token", "access", "forest", "ocean", "desert", "arctic",
    "jungle", "safari", "travel", "guide", "boggle", "clerk", "unhearing", "reprise",
    "configure", "history", "visual", "harbor", "lantern", "meadow", "copper", "velvet",
    "thunder", "willow", "canyon", "ember", "glacier", "marble", "nectar", "quartz",
    "saddle", "timber", "walnut", "zephyr",
];

/// Which character classes to draw from, and how many characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

impl PasswordOptions {
    fn classes(&self) -> Vec<&'static [u8]> {
        let mut classes = Vec::with_capacity(4);
        if self.uppercase {
            classes.push(UPPER);
        }
        if self.lowercase {
            classes.push(LOWER);
        }
        if self.numbers {
            classes.push(DIGITS);
        }
        if self.symbols {
            classes.push(SYMBOLS);
        }
        classes
    }

    /// Rough strength score in `0..=100`.
    pub fn strength(&self) -> u8 {
        let score = self.length * 4
            + if self.symbols { 15 } else { 0 }
            + if self.numbers { 10 } else { 0 };
        score.min(100) as u8
    }
}

/// Generate a password according to `options`.
pub fn generate_password(options: &PasswordOptions) -> Result<Zeroizing<String>> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&options.length) {
        return Err(VaultError::CommandFailed(format!(
            "password length must be between {MIN_LENGTH} and {MAX_LENGTH} (got {})",
            options.length
        )));
    }

    let classes = options.classes();
    if classes.is_empty() {
        return Err(VaultError::CommandFailed(
            "at least one character class must be enabled".into(),
        ));
    }

    let alphabet: Vec<u8> = classes.iter().flat_map(|c| c.iter().copied()).collect();
    let mut rng = rand::rng();
    let mut chars = Zeroizing::new(Vec::with_capacity(options.length));

    // One guaranteed pick per class, the rest from the full alphabet.
    for class in &classes {
        if let Some(c) = class.choose(&mut rng) {
            chars.push(*c);
        }
    }
    while chars.len() < options.length {
        let idx = rng.random_range(0..alphabet.len());
        chars.push(alphabet[idx]);
    }
    chars.shuffle(&mut rng);

    let password: String = chars.iter().map(|&b| b as char).collect();
    Ok(Zeroizing::new(password))
}

/// Shape of a word passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassphraseOptions {
    pub words: usize,
    pub separator: String,
    /// Upper-case the first letter of each word.
    pub capitalize: bool,
}

impl Default for PassphraseOptions {
    fn default() -> Self {
        Self {
            words: 4,
            separator: "-".into(),
            capitalize: true,
        }
    }
}

/// Generate a passphrase according to `options`, e.g. `Lunar-Clerk-Ocean-Rocket7`.
pub fn generate_passphrase(options: &PassphraseOptions) -> Result<Zeroizing<String>> {
    if !(MIN_WORDS..=MAX_WORDS).contains(&options.words) {
        return Err(VaultError::CommandFailed(format!(
            "passphrase must have between {MIN_WORDS} and {MAX_WORDS} words (got {})",
            options.words
        )));
    }

    let mut rng = rand::rng();
    let mut phrase = Zeroizing::new(String::new());
    for i in 0..options.words {
        if i > 0 {
            phrase.push_str(&options.separator);
        }
        let word = WORDS.choose(&mut rng).copied().unwrap_or("vault");
        let mut chars = word.chars();
        if let (true, Some(first)) = (options.capitalize, chars.next()) {
            phrase.push(first.to_ascii_uppercase());
            phrase.push_str(chars.as_str());
        } else {
            phrase.push_str(word);
        }
    }
    let digit = rng.random_range(0..10u8);
    phrase.push(char::from(b'0' + digit));
    Ok(phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_password_has_every_class() {
        for _ in 0..200 {
            let pw = generate_password(&PasswordOptions::default()).unwrap();
            assert_eq!(pw.len(), 16);
            assert!(pw.bytes().any(|b| UPPER.contains(&b)));
            assert!(pw.bytes().any(|b| LOWER.contains(&b)));
            assert!(pw.bytes().any(|b| DIGITS.contains(&b)));
            assert!(pw.bytes().any(|b| SYMBOLS.contains(&b)));
        }
    }

    #[test]
    fn digits_only() {
        let opts = PasswordOptions {
            length: 24,
            uppercase: false,
            lowercase: false,
            numbers: true,
            symbols: false,
        };
        let pw = generate_password(&opts).unwrap();
        assert_eq!(pw.len(), 24);
        assert!(pw.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn rejects_no_classes() {
        let opts = PasswordOptions {
            uppercase: false,
            lowercase: false,
            numbers: false,
            symbols: false,
            ..PasswordOptions::default()
        };
        assert!(generate_password(&opts).is_err());
    }

    #[test]
    fn rejects_out_of_range_length() {
        let short = PasswordOptions {
            length: 3,
            ..PasswordOptions::default()
        };
        let long = PasswordOptions {
            length: 129,
            ..PasswordOptions::default()
        };
        assert!(generate_password(&short).is_err());
        assert!(generate_password(&long).is_err());
    }

    #[test]
    fn strength_is_capped() {
        assert_eq!(PasswordOptions::default().strength(), 89);
        let long = PasswordOptions {
            length: 64,
            ..PasswordOptions::default()
        };
        assert_eq!(long.strength(), 100);
    }

    #[test]
    fn outputs_differ() {
        let a = generate_password(&PasswordOptions::default()).unwrap();
        let b = generate_password(&PasswordOptions::default()).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn default_passphrase_shape() {
        let phrase = generate_passphrase(&PassphraseOptions::default()).unwrap();
        let words: Vec<&str> = phrase.split('-').collect();
        assert_eq!(words.len(), 4);
        for word in &words {
            assert!(word.starts_with(|c: char| c.is_ascii_uppercase()));
        }
        let last = words[3];
        assert!(last.ends_with(|c: char| c.is_ascii_digit()));
        assert!(WORDS.contains(&last[..last.len() - 1].to_lowercase().as_str()));
    }

    #[test]
    fn passphrase_honors_separator_and_case() {
        let opts = PassphraseOptions {
            words: 6,
            separator: "_".into(),
            capitalize: false,
        };
        let phrase = generate_passphrase(&opts).unwrap();
        let words: Vec<&str> = phrase.split('_').collect();
        assert_eq!(words.len(), 6);
        for word in &words[..5] {
            assert!(WORDS.contains(word));
        }
        assert!(!phrase.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn passphrase_rejects_out_of_range_word_count() {
        for words in [0, 2, 9] {
            let opts = PassphraseOptions {
                words,
                ..PassphraseOptions::default()
            };
            assert!(generate_passphrase(&opts).is_err());
        }
    }
}
