//! X25519 key pairs derived deterministically from seed bytes.
//!
//! Derivation path: `nonce(4 BE bytes) || seed` -> BLAKE2b-256 -> Keccak-256
//! -> SHA-256 -> X25519 clamp -> base-point scalar multiplication. The same
//! `(seed, nonce)` always produces the same pair; distinct nonces act as an
//! account index over one seed.

use curve25519_dalek::scalar::clamp_integer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher as StdHasher};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroize;

use super::hash::{random_bytes, secure_hash, sha256};
use super::{CryptoError, CryptoResult};

/// X25519 secret key size in bytes
pub const SECRET_KEY_SIZE: usize = 32;
/// X25519 public key size in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// An X25519 public key: a Montgomery u-coordinate with the sign bit cleared.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl Hash for PublicKey {
    fn hash<H: StdHasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(self.0))
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(&s).map_err(serde::de::Error::custom)?
        } else {
            <Vec<u8>>::deserialize(deserializer)?
        };
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

impl PublicKey {
    /// Create from raw bytes
    ///
    /// # Errors
    /// Returns error if bytes are not the correct length
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::InvalidInputLength(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; PUBLIC_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Get underlying bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Copy underlying bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    ///
    /// # Errors
    /// Returns error if hex is invalid or not a valid public key
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| CryptoError::InvalidInputLength(format!("public key hex: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKey({}..)", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An X25519 secret key (clamped scalar).
///
/// SECURITY: This type intentionally does not implement Clone or Debug
/// to prevent accidental key leakage. Memory is zeroized on drop.
pub struct SecretKey([u8; SECRET_KEY_SIZE]);

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl SecretKey {
    /// Create from raw bytes
    ///
    /// # Errors
    /// Returns error if bytes are not the correct length
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SECRET_KEY_SIZE {
            return Err(CryptoError::InvalidInputLength(format!(
                "secret key must be {} bytes, got {}",
                SECRET_KEY_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; SECRET_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Get underlying bytes
    ///
    /// # Security
    /// Be careful with the returned bytes - they are the raw secret key material.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.0
    }
}

/// A key pair holding the secret scalar and its Montgomery public key.
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a key pair from a random 32-byte seed.
    #[must_use]
    pub fn generate() -> Self {
        let mut seed: [u8; 32] = random_bytes();
        let pair = derive_keypair(&seed, 0);
        seed.zeroize();
        pair
    }

    /// Derive a key pair from seed bytes with nonce 0.
    ///
    /// Same seed always produces the same pair.
    #[must_use]
    pub fn from_seed(seed: &[u8]) -> Self {
        derive_keypair(seed, 0)
    }

    /// Create from an existing secret key, recomputing the public half.
    #[must_use]
    pub fn from_secret(secret: SecretKey) -> Self {
        let public = public_from_secret(&secret.0);
        Self { secret, public }
    }

    /// Get the public key
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Get the secret key
    #[must_use]
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

/// Derive an X25519 key pair from seed bytes and a nonce.
///
/// The nonce is encoded as 4 big-endian bytes and prepended to the seed;
/// the result is expanded via `sha256(keccak256(blake2b256(material)))` and
/// clamped into a valid X25519 scalar. Deterministic: identical inputs always
/// yield identical pairs. Empty seeds are accepted.
#[must_use]
pub fn derive_keypair(seed: &[u8], nonce: u32) -> KeyPair {
    let mut material = Vec::with_capacity(4 + seed.len());
    material.extend_from_slice(&nonce.to_be_bytes());
    material.extend_from_slice(seed);

    let expanded = sha256(&secure_hash(&material));
    let secret = clamp_integer(expanded);
    let public = public_from_secret(&secret);

    KeyPair {
        secret: SecretKey(secret),
        public,
    }
}

/// Structural check for public key bytes. Fails closed: any wrong length
/// returns `false` rather than an error.
#[must_use]
pub fn verify_public_key(bytes: &[u8]) -> bool {
    bytes.len() == PUBLIC_KEY_SIZE
}

fn public_from_secret(secret: &[u8; SECRET_KEY_SIZE]) -> PublicKey {
    let mut public = X25519PublicKey::from(&StaticSecret::from(*secret)).to_bytes();
    // The u-coordinate is canonical (< 2^255), but the wire format pins
    // bit 255 to zero regardless.
    public[31] &= 0x7f;
    PublicKey(public)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SEED: &[u8] = b"test seed phrase for verification only";

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_keypair(SEED, 7);
        let b = derive_keypair(SEED, 7);
        assert_eq!(a.secret_key().to_bytes(), b.secret_key().to_bytes());
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_regression_anchor_nonce_zero() {
        // Pinned values: any change here signals a derivation break.
        let kp = derive_keypair(SEED, 0);
        assert_eq!(
            hex::encode(kp.secret_key().to_bytes()),
            "e8a21e382fea242936935963b909aa3d09886f03186d997669e7dc64738c5c7a"
        );
        assert_eq!(
            kp.public_key().to_hex(),
            "d4f0d7ffa1dfc61faff85b707615d77573e563d524f0e8365d8a3bc06e1e9c70"
        );
    }

    #[test]
    fn test_regression_anchor_nonce_one() {
        let kp = derive_keypair(SEED, 1);
        assert_eq!(
            hex::encode(kp.secret_key().to_bytes()),
            "809fc09b7b3afa64c7080bf3003305d3efe4ff6cf539a8d11eb0af32733b264a"
        );
        assert_eq!(
            kp.public_key().to_hex(),
            "a4e3ccf0e2f354b7ed1e7b2c06d2cefd74144698e1882f79634fc63bc17e9e4d"
        );
    }

    #[test]
    fn test_different_nonces_give_different_keys() {
        let a = derive_keypair(SEED, 0);
        let b = derive_keypair(SEED, 1);
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_empty_seed_is_accepted() {
        let kp = derive_keypair(b"", 0);
        assert_eq!(kp.public_key().as_bytes().len(), PUBLIC_KEY_SIZE);
    }

    #[test]
    fn test_secret_key_is_clamped() {
        let kp = derive_keypair(SEED, 0);
        let sk = kp.secret_key().to_bytes();
        assert_eq!(sk[0] & 0b0000_0111, 0);
        assert_eq!(sk[31] & 0b1000_0000, 0);
        assert_eq!(sk[31] & 0b0100_0000, 0b0100_0000);
    }

    #[test]
    fn test_public_key_sign_bit_is_clear() {
        let kp = derive_keypair(SEED, 0);
        assert_eq!(kp.public_key().as_bytes()[31] & 0x80, 0);
    }

    #[test]
    fn test_from_secret_recomputes_public() {
        let kp = derive_keypair(SEED, 3);
        let restored =
            KeyPair::from_secret(SecretKey::from_bytes(&kp.secret_key().to_bytes()).unwrap());
        assert_eq!(kp.public_key(), restored.public_key());
    }

    #[test]
    fn test_generate_produces_distinct_pairs() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_verify_public_key_checks_length() {
        assert!(verify_public_key(&[0u8; 32]));
        assert!(!verify_public_key(&[0u8; 31]));
        assert!(!verify_public_key(&[]));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let kp = derive_keypair(SEED, 0);
        let parsed = PublicKey::from_hex(&kp.public_key().to_hex()).unwrap();
        assert_eq!(kp.public_key(), &parsed);
    }

    #[test]
    fn test_public_key_serde_human_readable() {
        let kp = derive_keypair(SEED, 0);
        let json = serde_json::to_string(kp.public_key()).unwrap();
        assert_eq!(json, format!("\"{}\"", kp.public_key().to_hex()));
        let parsed: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(kp.public_key(), &parsed);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        assert!(PublicKey::from_bytes(&[0u8; 33]).is_err());
        assert!(SecretKey::from_bytes(&[0u8; 16]).is_err());
    }

    proptest! {
        #[test]
        fn prop_derivation_deterministic(seed in proptest::collection::vec(any::<u8>(), 0..64), nonce in any::<u32>()) {
            let a = derive_keypair(&seed, nonce);
            let b = derive_keypair(&seed, nonce);
            prop_assert_eq!(a.public_key().to_bytes(), b.public_key().to_bytes());
            prop_assert_eq!(a.secret_key().to_bytes(), b.secret_key().to_bytes());
        }

        #[test]
        fn prop_nonces_separate_keys(seed in proptest::collection::vec(any::<u8>(), 1..64), n1 in any::<u32>(), n2 in any::<u32>()) {
            prop_assume!(n1 != n2);
            let a = derive_keypair(&seed, n1);
            let b = derive_keypair(&seed, n2);
            prop_assert_ne!(a.public_key().to_bytes(), b.public_key().to_bytes());
        }
    }
}
