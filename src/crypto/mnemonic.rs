//! BIP39 mnemonic seed phrase support for wallet recovery.
//!
//! Standard 24-word seed phrases feed the deterministic derivation pipeline:
//! mnemonic -> BIP39 seed (with passphrase) -> `derive_keypair(seed, 0)`.
//! The same mnemonic + passphrase always produces the same wallet keys.

use bip39::{Language, Mnemonic};

use super::keys::{derive_keypair, KeyPair};
use super::{CryptoError, CryptoResult};

/// Number of words in the mnemonic (24 words = 256 bits of entropy)
pub const MNEMONIC_WORD_COUNT: usize = 24;

/// Generate a new random mnemonic phrase.
///
/// Returns a 24-word BIP39 mnemonic using the English word list.
#[must_use]
pub fn generate_mnemonic() -> Mnemonic {
    let entropy: [u8; MNEMONIC_WORD_COUNT * 4 / 3] = super::hash::random_bytes();
    Mnemonic::from_entropy_in(Language::English, &entropy)
        .expect("entropy length is valid for 24-word mnemonic")
}

/// Parse a mnemonic phrase from a string.
///
/// # Errors
/// Returns error if the phrase is invalid (wrong words, checksum, etc.)
pub fn parse_mnemonic(phrase: &str) -> CryptoResult<Mnemonic> {
    Mnemonic::parse_in(Language::English, phrase)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))
}

/// Deterministically derive a key pair from a mnemonic.
///
/// Derivation path: BIP39 mnemonic -> 64-byte seed (with passphrase)
/// -> `derive_keypair(seed, 0)`.
#[must_use]
pub fn keypair_from_mnemonic(mnemonic: &Mnemonic, passphrase: &str) -> KeyPair {
    let seed = mnemonic.to_seed(passphrase);
    derive_keypair(&seed, 0)
}

/// Derive a key pair from a mnemonic phrase string.
///
/// # Errors
/// Returns error if the phrase is invalid
pub fn keypair_from_phrase(phrase: &str, passphrase: &str) -> CryptoResult<KeyPair> {
    let mnemonic = parse_mnemonic(phrase)?;
    Ok(keypair_from_mnemonic(&mnemonic, passphrase))
}

/// Convert a mnemonic to its word list.
#[must_use]
pub fn mnemonic_to_words(mnemonic: &Mnemonic) -> Vec<&'static str> {
    mnemonic.words().collect()
}
