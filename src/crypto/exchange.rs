//! X25519 shared-key agreement with HMAC domain separation.
//!
//! The raw Diffie-Hellman output is never used directly: it is mixed through
//! `HMAC-SHA-256(key = sha256(prefix), msg = dh)`, so different protocol
//! prefixes produce unrelated symmetric keys from the same key pairs.

use subtle::ConstantTimeEq;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroize;

use super::hash::{hmac_sha256, sha256};
use super::keys::{PublicKey, SecretKey};
use super::{CryptoError, CryptoResult};

/// Shared symmetric key size in bytes
pub const SHARED_KEY_SIZE: usize = 32;

/// A 32-byte symmetric key agreed between two parties.
///
/// SECURITY: Memory is zeroized on drop; equality is constant-time.
pub struct SharedKey([u8; SHARED_KEY_SIZE]);

impl Drop for SharedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl From<[u8; SHARED_KEY_SIZE]> for SharedKey {
    fn from(bytes: [u8; SHARED_KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl PartialEq for SharedKey {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }
}

impl Eq for SharedKey {}

impl core::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SharedKey(<redacted>)")
    }
}

impl SharedKey {
    /// Get underlying bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SHARED_KEY_SIZE] {
        &self.0
    }
}

/// Derive a shared symmetric key from our secret key and a peer's public key.
///
/// Symmetric by the ECDH property: `shared_key(a, B, p) == shared_key(b, A, p)`
/// for matching pairs.
///
/// # Errors
/// Returns `InvalidSharedSecret` if the Diffie-Hellman output is the all-zero
/// point (a degenerate or small-subgroup public key).
pub fn shared_key(secret: &SecretKey, public: &PublicKey, prefix: &[u8]) -> CryptoResult<SharedKey> {
    let raw = StaticSecret::from(secret.to_bytes())
        .diffie_hellman(&X25519PublicKey::from(public.to_bytes()));
    if !raw.was_contributory() {
        return Err(CryptoError::InvalidSharedSecret);
    }
    Ok(SharedKey(hmac_sha256(&sha256(prefix), raw.as_bytes())))
}
