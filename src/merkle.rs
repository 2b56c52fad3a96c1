//! Merkle proof verification.
//!
//! Proofs are a flat byte sequence of `(side, size, hash[size])` records with
//! no overall length prefix; the buffer end terminates the walk. Leaves are
//! hashed as `blake2b256(0x00 || leaf)` and interior nodes as
//! `blake2b256(0x01 || left || right)`, which domain-separates the two levels
//! against second-preimage splicing.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use subtle::ConstantTimeEq;

use crate::crypto::{CryptoError, CryptoResult};

type Blake2b256 = Blake2b<U32>;

/// Root hash size in bytes
pub const ROOT_HASH_SIZE: usize = 32;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Which side of the accumulator a sibling hash sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Accumulator first, sibling hash second
    Left,
    /// Sibling hash first, accumulator second
    Right,
}

impl Side {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }
}

/// Verify a serialized Merkle proof for `leaf` against a 32-byte root hash.
///
/// An empty proof is valid and simply requires the leaf hash to equal the
/// root. The final comparison is constant-time.
///
/// # Errors
/// - `InvalidRootHashLength` if `root` is not exactly 32 bytes
/// - `MalformedProof` if a record declares a zero size, extends past the
///   buffer end, is missing its size byte, or carries an unknown side byte
pub fn verify_proof(root: &[u8], proof: &[u8], leaf: &[u8]) -> CryptoResult<bool> {
    if root.len() != ROOT_HASH_SIZE {
        return Err(CryptoError::InvalidRootHashLength(root.len()));
    }

    let mut acc = hash_leaf(leaf);
    let mut rest = proof;
    while !rest.is_empty() {
        let side =
            Side::from_byte(rest[0]).ok_or(CryptoError::MalformedProof("unknown side byte"))?;
        if rest.len() < 2 {
            return Err(CryptoError::MalformedProof("missing size byte"));
        }
        let size = rest[1] as usize;
        if size == 0 {
            return Err(CryptoError::MalformedProof("zero-length hash"));
        }
        if rest.len() < 2 + size {
            return Err(CryptoError::MalformedProof("record extends past buffer end"));
        }
        let sibling = &rest[2..2 + size];
        acc = match side {
            Side::Left => hash_node(&acc, sibling),
            Side::Right => hash_node(sibling, &acc),
        };
        rest = &rest[2 + size..];
    }

    Ok(bool::from(acc.ct_eq(root)))
}

/// `blake2b256(0x00 || leaf)`
#[must_use]
pub fn hash_leaf(leaf: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(leaf);
    hasher.finalize().into()
}

/// `blake2b256(0x01 || left || right)`
#[must_use]
pub fn hash_node(left: &[u8], right: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}
