//! Hash primitives shared across the crate.
//!
//! Address and key derivation both use the BLAKE2b-256 -> Keccak-256
//! composition ([`secure_hash`]); the signature engine uses SHA-512 for
//! scalar derivation and the envelope layer uses HMAC-SHA-256 tags.

use blake2::digest::consts::U32;
use blake2::Blake2b;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};
use sha3::Keccak256;

type Blake2b256 = Blake2b<U32>;
type HmacSha256 = Hmac<Sha256>;

/// Compute SHA-256 of the input data.
#[inline]
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-512 of the input data.
#[inline]
#[must_use]
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Compute BLAKE2b-256 of the input data.
#[inline]
#[must_use]
pub fn blake2b256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute Keccak-256 (original padding, as used by Ethereum) of the input data.
#[inline]
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute `keccak256(blake2b256(data))`.
///
/// This composition is the hash used for both address construction and
/// seed expansion during key derivation.
#[inline]
#[must_use]
pub fn secure_hash(data: &[u8]) -> [u8; 32] {
    keccak256(&blake2b256(data))
}

/// Compute HMAC-SHA-256 over `data` with the given key.
#[must_use]
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Fill a fixed-size buffer from the operating system CSPRNG.
///
/// Every call draws fresh output; there is no shared RNG state.
#[must_use]
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut out = [0u8; N];
    OsRng.fill_bytes(&mut out);
    out
}
