//! Curve25519 signatures over X25519 keys.
//!
//! Keys live on the Montgomery curve (X25519); signing lifts the clamped
//! secret scalar onto the Ed25519 Edwards curve and produces an
//! RFC-8032-shaped `R || S` signature. Because verifiers only hold the
//! Montgomery u-coordinate, the sign of the reconstructed Edwards public key
//! is carried in bit 7 of signature byte 63. That bit is not part of `S`
//! (canonical scalars leave it clear), and the layout is a fixed wire format:
//! existing signatures in the wild depend on it bit-for-bit.
//!
//! Signing comes in two flavors selected by the optional 64-byte randomness
//! parameter: deterministic (none supplied) and randomized (same message and
//! key yield different signatures per call, all of which verify).

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::{clamp_integer, Scalar};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};
use std::fmt;

use super::keys::{PublicKey, SecretKey, PUBLIC_KEY_SIZE};
use super::{CryptoError, CryptoResult};

/// Signature size in bytes: `R (32) || S (32)`
pub const SIGNATURE_SIZE: usize = 64;

/// Domain prefix for the randomized nonce derivation: `0xFE || 0xFF * 31`.
const RANDOMIZED_NONCE_PREFIX: [u8; 32] = {
    let mut prefix = [0xFFu8; 32];
    prefix[0] = 0xFE;
    prefix
};

/// A 64-byte Curve25519 signature with the Edwards sign bit folded into
/// bit 7 of the final byte.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Serialize for Signature {
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

impl<'de> Deserialize<'de> for Signature {
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

impl Signature {
    /// Create from raw bytes
    ///
    /// # Errors
    /// Returns error if bytes are not the correct length
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SIGNATURE_SIZE {
            return Err(CryptoError::InvalidInputLength(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; SIGNATURE_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Get underlying bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sig({}..)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Compute the compressed Edwards public key for a secret key.
///
/// The clamped secret is reduced mod the group order and multiplied against
/// the Edwards base point. Stateless and reentrant; byte 31's top bit is the
/// sign of the x-coordinate.
#[must_use]
pub fn edwards_public_key(secret: &SecretKey) -> [u8; 32] {
    let scalar = Scalar::from_bytes_mod_order(clamp_integer(secret.to_bytes()));
    EdwardsPoint::mul_base(&scalar).compress().to_bytes()
}

/// Sign a message.
///
/// With `randomness` absent the nonce is `SHA-512(clamped || message)` reduced
/// mod the group order, so signing is fully deterministic. With a 64-byte
/// `randomness` value the nonce is
/// `SHA-512(0xFE || 0xFF*31 || clamped || message || randomness)`, giving a
/// different signature per call that still verifies against the same key.
///
/// Empty messages are valid input.
#[must_use]
pub fn sign(secret: &SecretKey, message: &[u8], randomness: Option<&[u8; 64]>) -> Signature {
    let clamped = clamp_integer(secret.to_bytes());
    let scalar = Scalar::from_bytes_mod_order(clamped);
    let ed_public = EdwardsPoint::mul_base(&scalar).compress().to_bytes();
    let sign_bit = ed_public[31] & 0x80;

    let r = match randomness {
        Some(random64) => {
            let mut hasher = Sha512::new();
            hasher.update(RANDOMIZED_NONCE_PREFIX);
            hasher.update(clamped);
            hasher.update(message);
            hasher.update(random64);
            wide_scalar(hasher)
        }
        None => {
            let mut hasher = Sha512::new();
            hasher.update(clamped);
            hasher.update(message);
            wide_scalar(hasher)
        }
    };

    let big_r = EdwardsPoint::mul_base(&r).compress().to_bytes();

    let mut hasher = Sha512::new();
    hasher.update(big_r);
    hasher.update(ed_public);
    hasher.update(message);
    let hram = wide_scalar(hasher);

    let s = r + hram * scalar;

    let mut sig = [0u8; SIGNATURE_SIZE];
    sig[..32].copy_from_slice(&big_r);
    sig[32..].copy_from_slice(s.as_bytes());
    // Canonical scalars are < 2^253, so bit 7 of byte 63 is free for the
    // Edwards sign bit.
    sig[63] |= sign_bit;
    Signature(sig)
}

/// Verify a signature against a Montgomery public key.
///
/// Fails closed: wrong lengths, non-canonical scalars, and point decode
/// failures all return `false`, never an error.
#[must_use]
pub fn verify(public: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    verify_bytes(public.as_bytes(), message, signature.as_bytes())
}

/// Slice-level signature verification for callers holding raw bytes.
#[must_use]
pub fn verify_bytes(public: &[u8], message: &[u8], signature: &[u8]) -> bool {
    if public.len() != PUBLIC_KEY_SIZE || signature.len() != SIGNATURE_SIZE {
        return false;
    }

    let sign_bit = signature[63] & 0x80;
    let mut s_bytes = [0u8; 32];
    s_bytes.copy_from_slice(&signature[32..]);
    s_bytes[31] &= 0x7f;
    let Some(s) = Option::<Scalar>::from(Scalar::from_canonical_bytes(s_bytes)) else {
        return false;
    };

    let mut u = [0u8; 32];
    u.copy_from_slice(public);
    // y = (u - 1) / (u + 1), with the sign bit recovered from the signature.
    let Some(ed_point) = MontgomeryPoint(u).to_edwards(sign_bit >> 7) else {
        return false;
    };
    let ed_public = ed_point.compress().to_bytes();

    let mut r_bytes = [0u8; 32];
    r_bytes.copy_from_slice(&signature[..32]);
    let Some(big_r) = CompressedEdwardsY(r_bytes).decompress() else {
        return false;
    };

    let mut hasher = Sha512::new();
    hasher.update(r_bytes);
    hasher.update(ed_public);
    hasher.update(message);
    let hram = wide_scalar(hasher);

    EdwardsPoint::mul_base(&s) == big_r + ed_point * hram
}

fn wide_scalar(hasher: Sha512) -> Scalar {
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&hasher.finalize());
    Scalar::from_bytes_mod_order_wide(&wide)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::derive_keypair;
    use proptest::prelude::*;

    const SEED: &[u8] = b"test seed phrase for verification only";
    const MSG: &[u8] = b"the quick brown fox jumps over the lazy dog";

    #[test]
    fn test_edwards_public_key_anchor() {
        let kp = derive_keypair(SEED, 0);
        assert_eq!(
            hex::encode(edwards_public_key(kp.secret_key())),
            "2d7af1acddbc94babdfa679deb01e44019ec283a243d970925a77bb9cadd89d3"
        );
    }

    #[test]
    fn test_deterministic_signature_anchor() {
        let kp = derive_keypair(SEED, 0);
        let sig = sign(kp.secret_key(), MSG, None);
        assert_eq!(
            sig.to_hex(),
            "022864df6a701e1fb5c4767ed07a4082645d373fbea0daa89629f15772d2aab0\
             b3ea6dfdef763afbd2dc913bcb6c6415a4387ea95cddbc4fe3928af530f96980"
        );
        assert!(verify(kp.public_key(), MSG, &sig));
    }

    #[test]
    fn test_randomized_signature_anchor() {
        let kp = derive_keypair(SEED, 0);
        let sig = sign(kp.secret_key(), MSG, Some(&[0x5A; 64]));
        assert_eq!(
            sig.to_hex(),
            "18f891a190d8571bcd5275713f3026bfc128d871f939b459b153f67bc0417f61\
             c4e00ad907a116816035b7c7ff14369ce37406420b044b16966c75fa1286a88a"
        );
        assert!(verify(kp.public_key(), MSG, &sig));
    }

    #[test]
    fn test_randomized_differs_from_deterministic_but_verifies() {
        let kp = derive_keypair(SEED, 0);
        let det = sign(kp.secret_key(), MSG, None);
        let rnd1 = sign(kp.secret_key(), MSG, Some(&[0x01; 64]));
        let rnd2 = sign(kp.secret_key(), MSG, Some(&[0x02; 64]));
        assert_ne!(det.as_bytes(), rnd1.as_bytes());
        assert_ne!(rnd1.as_bytes(), rnd2.as_bytes());
        assert!(verify(kp.public_key(), MSG, &rnd1));
        assert!(verify(kp.public_key(), MSG, &rnd2));
    }

    #[test]
    fn test_empty_message_signs_and_verifies() {
        let kp = derive_keypair(SEED, 0);
        let sig = sign(kp.secret_key(), b"", None);
        assert_eq!(
            sig.to_hex(),
            "718d9b2570a12fa0be93aada9754d881123c6c1cd0e3de467e453bdf183afe1d\
             4da6a56c93c28c90637f5f917fcf87e838ea3dae7cbf7a0a2e8dde74827b5587"
        );
        assert!(verify(kp.public_key(), b"", &sig));
    }

    #[test]
    fn test_tampered_message_fails() {
        let kp = derive_keypair(SEED, 0);
        let sig = sign(kp.secret_key(), MSG, None);
        let mut tampered = MSG.to_vec();
        tampered[0] ^= 0x01;
        assert!(!verify(kp.public_key(), &tampered, &sig));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let kp = derive_keypair(SEED, 0);
        let sig = sign(kp.secret_key(), MSG, None);
        for byte in [0usize, 31, 32, 63] {
            let mut bytes = *sig.as_bytes();
            bytes[byte] ^= 0x04;
            let bad = Signature::from_bytes(&bytes).unwrap();
            assert!(!verify(kp.public_key(), MSG, &bad), "byte {byte}");
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let kp = derive_keypair(SEED, 0);
        let other = derive_keypair(SEED, 1);
        let sig = sign(kp.secret_key(), MSG, None);
        assert!(!verify(other.public_key(), MSG, &sig));
    }

    #[test]
    fn test_sign_bit_matches_edwards_key() {
        let kp = derive_keypair(SEED, 0);
        let ed = edwards_public_key(kp.secret_key());
        let sig = sign(kp.secret_key(), MSG, None);
        assert_eq!(sig.as_bytes()[63] & 0x80, ed[31] & 0x80);
    }

    #[test]
    fn test_verify_bytes_rejects_bad_lengths() {
        let kp = derive_keypair(SEED, 0);
        let sig = sign(kp.secret_key(), MSG, None);
        assert!(!verify_bytes(
            &kp.public_key().as_bytes()[..31],
            MSG,
            sig.as_ref()
        ));
        assert!(!verify_bytes(
            kp.public_key().as_bytes(),
            MSG,
            &sig.as_bytes()[..63]
        ));
        assert!(!verify_bytes(&[], MSG, &[]));
    }

    #[test]
    fn test_signature_from_bytes_length_check() {
        assert!(Signature::from_bytes(&[0u8; 63]).is_err());
        assert!(Signature::from_bytes(&[0u8; 64]).is_ok());
    }

    #[test]
    fn test_signature_serde_roundtrip() {
        let kp = derive_keypair(SEED, 0);
        let sig = sign(kp.secret_key(), MSG, None);
        let json = serde_json::to_string(&sig).unwrap();
        let parsed: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, parsed);
    }

    proptest! {
        #[test]
        fn prop_sign_verify_roundtrip(
            seed in proptest::collection::vec(any::<u8>(), 0..48),
            msg in proptest::collection::vec(any::<u8>(), 0..128),
        ) {
            let kp = derive_keypair(&seed, 0);
            let sig = sign(kp.secret_key(), &msg, None);
            prop_assert!(verify(kp.public_key(), &msg, &sig));
        }

        #[test]
        fn prop_bit_flip_in_message_fails(
            msg in proptest::collection::vec(any::<u8>(), 1..64),
            flip_byte in 0usize..64,
            flip_bit in 0u8..8,
        ) {
            let kp = derive_keypair(b"prop seed", 0);
            let sig = sign(kp.secret_key(), &msg, None);
            let mut tampered = msg.clone();
            let idx = flip_byte % tampered.len();
            tampered[idx] ^= 1 << flip_bit;
            prop_assert!(!verify(kp.public_key(), &tampered, &sig));
        }
    }
}
