//! Authenticated message envelopes over a shared symmetric key.
//!
//! Encrypt-then-MAC with a random per-message content-encryption key (CEK):
//! the plaintext is AES-256-CTR encrypted under the CEK, the CEK is wrapped
//! with AES-256-ECB under the shared key, and two HMAC-SHA-256 tags bind the
//! wrapped key and the content separately. The split tags let decryption
//! distinguish "wrong shared key" from "tampered ciphertext" without leaking
//! anything beyond accept/reject.
//!
//! Wire layout: `version(1) || wrapped_cek(32) || mac_cek(32) ||
//! mac_content(32) || iv(16) || ciphertext`.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use aes::Aes256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::exchange::SharedKey;
use super::hash::{hmac_sha256, random_bytes};
use super::{CryptoError, CryptoResult};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Envelope format version
pub const ENVELOPE_VERSION: u8 = 1;

const CEK_SIZE: usize = 32;
const MAC_SIZE: usize = 32;
const IV_SIZE: usize = 16;
/// Fixed header size before the ciphertext begins
pub const ENVELOPE_HEADER_SIZE: usize = 1 + CEK_SIZE + MAC_SIZE + MAC_SIZE + IV_SIZE;

/// Encrypt a UTF-8 message under a shared key.
///
/// A fresh CEK and IV are drawn from the OS CSPRNG per call, so encrypting
/// the same plaintext twice yields different envelopes.
#[must_use]
pub fn encrypt_message(shared: &SharedKey, plaintext: &str) -> Vec<u8> {
    let mut cek: [u8; CEK_SIZE] = random_bytes();
    let iv: [u8; IV_SIZE] = random_bytes();
    let envelope = seal(shared, plaintext.as_bytes(), &cek, &iv);
    cek.zeroize();
    envelope
}

fn seal(shared: &SharedKey, plaintext: &[u8], cek: &[u8; CEK_SIZE], iv: &[u8; IV_SIZE]) -> Vec<u8> {
    let ciphertext = aes_ctr_apply(cek, iv, plaintext);
    let wrapped_cek = aes_ecb_encrypt(shared.as_bytes(), cek);
    let mac_content = hmac_sha256(cek, plaintext);
    let mac_cek = cek_tag(shared, cek, iv);

    let mut envelope = Vec::with_capacity(ENVELOPE_HEADER_SIZE + ciphertext.len());
    envelope.push(ENVELOPE_VERSION);
    envelope.extend_from_slice(&wrapped_cek);
    envelope.extend_from_slice(&mac_cek);
    envelope.extend_from_slice(&mac_content);
    envelope.extend_from_slice(iv);
    envelope.extend_from_slice(&ciphertext);
    envelope
}

/// Decrypt an envelope produced by [`encrypt_message`].
///
/// # Errors
/// - `MalformedEnvelope` if the envelope is truncated or carries an unknown
///   version byte
/// - `InvalidKey` if the key tag does not authenticate (wrong shared key)
/// - `InvalidMessage` if the content tag does not authenticate (tampering)
/// - `InvalidUtf8` if the authenticated plaintext is not valid UTF-8
pub fn decrypt_message(shared: &SharedKey, envelope: &[u8]) -> CryptoResult<String> {
    if envelope.len() < ENVELOPE_HEADER_SIZE {
        return Err(CryptoError::MalformedEnvelope("truncated header"));
    }
    if envelope[0] != ENVELOPE_VERSION {
        return Err(CryptoError::MalformedEnvelope("unsupported version"));
    }

    let mut wrapped_cek = [0u8; CEK_SIZE];
    wrapped_cek.copy_from_slice(&envelope[1..1 + CEK_SIZE]);
    let mac_cek = &envelope[33..33 + MAC_SIZE];
    let mac_content = &envelope[65..65 + MAC_SIZE];
    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&envelope[97..97 + IV_SIZE]);
    let ciphertext = &envelope[ENVELOPE_HEADER_SIZE..];

    let mut cek = aes_ecb_decrypt(shared.as_bytes(), &wrapped_cek);

    let expected_cek_tag = cek_tag(shared, &cek, &iv);
    if !bool::from(expected_cek_tag.ct_eq(mac_cek)) {
        cek.zeroize();
        return Err(CryptoError::InvalidKey);
    }

    let plaintext = aes_ctr_apply(&cek, &iv, ciphertext);

    let expected_content_tag = hmac_sha256(&cek, &plaintext);
    cek.zeroize();
    if !bool::from(expected_content_tag.ct_eq(mac_content)) {
        return Err(CryptoError::InvalidMessage);
    }

    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
}

/// Tag binding the wrapped key to this envelope: `HMAC(shared, cek || iv)`.
fn cek_tag(shared: &SharedKey, cek: &[u8; CEK_SIZE], iv: &[u8; IV_SIZE]) -> [u8; MAC_SIZE] {
    let mut bound = [0u8; CEK_SIZE + IV_SIZE];
    bound[..CEK_SIZE].copy_from_slice(cek);
    bound[CEK_SIZE..].copy_from_slice(iv);
    let tag = hmac_sha256(shared.as_bytes(), &bound);
    bound.zeroize();
    tag
}

fn aes_ctr_apply(key: &[u8; 32], iv: &[u8; IV_SIZE], data: &[u8]) -> Vec<u8> {
    let mut cipher = Aes256Ctr::new(GenericArray::from_slice(key), GenericArray::from_slice(iv));
    let mut buf = data.to_vec();
    cipher.apply_keystream(&mut buf);
    buf
}

fn aes_ecb_encrypt(key: &[u8; 32], data: &[u8; CEK_SIZE]) -> [u8; CEK_SIZE] {
    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut out = [0u8; CEK_SIZE];
    for (chunk, slot) in data.chunks(16).zip(out.chunks_mut(16)) {
        let mut block = GenericArray::clone_from_slice(chunk);
        cipher.encrypt_block(&mut block);
        slot.copy_from_slice(&block);
    }
    out
}

fn aes_ecb_decrypt(key: &[u8; 32], data: &[u8; CEK_SIZE]) -> [u8; CEK_SIZE] {
    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut out = [0u8; CEK_SIZE];
    for (chunk, slot) in data.chunks(16).zip(out.chunks_mut(16)) {
        let mut block = GenericArray::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        slot.copy_from_slice(&block);
    }
    out
}
