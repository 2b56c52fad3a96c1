//! Checksummed network addresses derived from public keys.
//!
//! Layout (26 bytes): `[version = 1][chain id][20-byte public key hash]
//! [4-byte checksum]`, where the hash is the first 20 bytes of
//! `keccak256(blake2b256(public_key))` and the checksum is the first 4 bytes
//! of the same composition over the preceding 22 bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::crypto::hash::secure_hash;
use crate::crypto::{CryptoError, CryptoResult, PublicKey};

/// Address size in bytes
pub const ADDRESS_SIZE: usize = 26;
/// Address format version
pub const ADDRESS_VERSION: u8 = 1;

const HASH_OFFSET: usize = 2;
const CHECKSUM_OFFSET: usize = 22;

/// A single-byte network discriminator embedded in addresses.
///
/// Constructed from a raw byte or an ASCII character; two chain ids are
/// equal iff their numeric forms match.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(u8);

impl ChainId {
    /// Create from a raw byte value
    #[must_use]
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    /// Create from an ASCII character, e.g. `'L'` for a mainnet.
    ///
    /// Returns `None` for non-ASCII characters.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        if c.is_ascii() {
            Some(Self(c as u8))
        } else {
            None
        }
    }

    /// Get the numeric form
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self.0
    }
}

impl From<u8> for ChainId {
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_ascii_graphic() {
            write!(f, "ChainId('{}')", self.0 as char)
        } else {
            write!(f, "ChainId({:#04x})", self.0)
        }
    }
}

/// A checksummed 26-byte network address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// Build the address for a public key on the given chain.
    #[must_use]
    pub fn from_public_key(public: &PublicKey, chain_id: ChainId) -> Self {
        let mut addr = [0u8; ADDRESS_SIZE];
        addr[0] = ADDRESS_VERSION;
        addr[1] = chain_id.to_byte();
        addr[HASH_OFFSET..CHECKSUM_OFFSET]
            .copy_from_slice(&secure_hash(public.as_bytes())[..20]);
        let checksum = secure_hash(&addr[..CHECKSUM_OFFSET]);
        addr[CHECKSUM_OFFSET..].copy_from_slice(&checksum[..4]);
        Self(addr)
    }

    /// Create an address from raw bytes
    ///
    /// Only the length is checked here; use [`Address::verify`] for the
    /// checksum.
    ///
    /// # Errors
    /// Returns error if bytes are not the correct length
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != ADDRESS_SIZE {
            return Err(CryptoError::InvalidInputLength(format!(
                "address must be {} bytes, got {}",
                ADDRESS_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; ADDRESS_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Get the underlying bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// The chain id byte embedded in this address
    #[must_use]
    pub const fn chain_id(&self) -> ChainId {
        ChainId::new(self.0[1])
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    ///
    /// # Errors
    /// Returns error if hex is invalid or wrong length
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| CryptoError::InvalidInputLength(format!("address hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Verify this address, optionally against an expected chain id and the
    /// public key it should have been built from.
    #[must_use]
    pub fn verify(&self, chain_id: Option<ChainId>, public: Option<&PublicKey>) -> bool {
        verify_address(&self.0, chain_id, public)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Verify address bytes. Fails closed: any length mismatch, version
/// mismatch, or checksum failure returns `false` rather than an error.
///
/// Checks, in order: version byte, chain id (when given), checksum, and —
/// when a public key is given — exact byte equality with the address
/// rebuilt from that key.
#[must_use]
pub fn verify_address(bytes: &[u8], chain_id: Option<ChainId>, public: Option<&PublicKey>) -> bool {
    if bytes.len() != ADDRESS_SIZE {
        return false;
    }
    if bytes[0] != ADDRESS_VERSION {
        return false;
    }
    if let Some(chain) = chain_id {
        if bytes[1] != chain.to_byte() {
            return false;
        }
    }
    let checksum = secure_hash(&bytes[..CHECKSUM_OFFSET]);
    if !bool::from(bytes[CHECKSUM_OFFSET..].ct_eq(&checksum[..4])) {
        return false;
    }
    if let Some(public) = public {
        let rebuilt = Address::from_public_key(public, ChainId::new(bytes[1]));
        return bool::from(rebuilt.as_bytes().ct_eq(bytes));
    }
    true
}
