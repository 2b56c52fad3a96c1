//! # Chaincrypt
//!
//! Key derivation, Curve25519 signatures, and authenticated messaging for
//! chain addresses.
//!
//! ## Components
//!
//! - **Key derivation**: seed bytes (+ nonce) -> deterministic X25519 pair
//! - **Addresses**: checksummed 26-byte addresses bound to a chain id
//! - **Signatures**: Curve25519 sign/verify bridging Montgomery and Edwards
//!   curve forms, with deterministic and randomized nonce modes
//! - **Key agreement**: X25519 shared keys with HMAC domain separation
//! - **Envelopes**: encrypt-then-MAC message format with per-message keys
//! - **Merkle proofs**: serialized proof-path verification
//!
//! ## Security Model
//!
//! Every operation is a pure function of its inputs; randomness is drawn
//! from the OS CSPRNG only where an API explicitly generates fresh material
//! (keys, mnemonics, envelope CEK/IV). Boolean verification predicates fail
//! closed, and authentication tags are compared in constant time.

#![forbid(unsafe_code)]
#![deny(clippy::all, rust_2018_idioms)]
#![warn(clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Const fn not always beneficial for complex types
    clippy::missing_const_for_fn,
    // must_use on every fn is excessive
    clippy::must_use_candidate
)]

pub mod crypto;
pub mod merkle;
pub mod types;

pub use crypto::{
    decrypt_message, derive_keypair, edwards_public_key, encrypt_message, generate_mnemonic,
    keypair_from_mnemonic, keypair_from_phrase, parse_mnemonic, shared_key, sign, verify,
    verify_bytes, verify_public_key, CryptoError, CryptoResult, KeyPair, PublicKey, SecretKey,
    SharedKey, Signature, MNEMONIC_WORD_COUNT, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE, SIGNATURE_SIZE,
};
pub use merkle::{verify_proof, Side};
pub use types::{verify_address, Address, ChainId, ADDRESS_SIZE, ADDRESS_VERSION};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
