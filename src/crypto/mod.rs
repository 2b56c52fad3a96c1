//! Cryptographic primitives for the chain address scheme.
//!
//! - X25519 key pairs derived deterministically from seed bytes
//! - Curve25519 signatures bridging Montgomery and Edwards curve forms
//! - X25519 shared-key agreement with HMAC domain separation
//! - Authenticated AES-CTR message envelopes
//! - BIP39 mnemonic seed phrases for wallet recovery

pub mod envelope;
pub mod exchange;
pub mod hash;
mod keys;
mod mnemonic;
mod signature;

pub use envelope::{decrypt_message, encrypt_message, ENVELOPE_HEADER_SIZE, ENVELOPE_VERSION};
pub use exchange::{shared_key, SharedKey, SHARED_KEY_SIZE};
pub use keys::{
    derive_keypair, verify_public_key, KeyPair, PublicKey, SecretKey, PUBLIC_KEY_SIZE,
    SECRET_KEY_SIZE,
};
pub use mnemonic::{
    generate_mnemonic, keypair_from_mnemonic, keypair_from_phrase, mnemonic_to_words,
    parse_mnemonic, MNEMONIC_WORD_COUNT,
};
pub use signature::{
    edwards_public_key, sign, verify, verify_bytes, Signature, SIGNATURE_SIZE,
};

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Wrong byte count for a key, signature, or hash input
    #[error("invalid input length: {0}")]
    InvalidInputLength(String),
    /// Diffie-Hellman produced the all-zero point (degenerate public key)
    #[error("degenerate shared secret")]
    InvalidSharedSecret,
    /// Structurally truncated or unrecognized envelope
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),
    /// Structurally invalid Merkle proof
    #[error("malformed proof: {0}")]
    MalformedProof(&'static str),
    /// Key authentication tag mismatch during decryption
    #[error("key authentication failed")]
    InvalidKey,
    /// Content authentication tag mismatch during decryption
    #[error("message authentication failed")]
    InvalidMessage,
    /// Merkle root hash is not exactly 32 bytes
    #[error("invalid root hash length: expected 32 bytes, got {0}")]
    InvalidRootHashLength(usize),
    /// Authenticated plaintext is not valid UTF-8
    #[error("plaintext is not valid UTF-8")]
    InvalidUtf8,
    /// Invalid mnemonic phrase
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
