//! XChaCha20-Poly1305 encryption and decryption.
//!
//! # Wire Format
//!
//! The ciphertext format is: `nonce (24 bytes) || AEAD(base64(plaintext)) || tag (16 bytes)`
//!
//! - **Nonce**: 24-byte random value, safe to generate randomly without collision risk
//! - **Body**: the plaintext is base64-encoded before sealing, so a successful
//!   open always yields text-safe bytes that are then decoded
//! - **Tag**: 16-byte authentication tag appended by the cipher

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};

use super::error::{CryptoError, CryptoResult};
use super::key::EncryptionKey;

/// Size of the XChaCha20-Poly1305 nonce in bytes.
pub const NONCE_SIZE: usize = 24;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Minimum size of valid ciphertext (nonce + tag, no plaintext).
pub const MIN_CIPHERTEXT_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Encrypts plaintext using XChaCha20-Poly1305.
///
/// Returns the ciphertext with the nonce prepended.
///
/// # Arguments
///
/// * `key` - The 256-bit encryption key
/// * `plaintext` - The data to encrypt
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let encoded = STANDARD.encode(plaintext);
    let ciphertext = cipher
        .encrypt(&nonce, encoded.as_bytes())
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypts ciphertext produced by [`encrypt`].
///
/// # Errors
///
/// - [`CryptoError::CorruptCiphertext`] if the input is shorter than nonce + tag,
///   or fails authentication (wrong key, corrupted data, tampering)
/// - [`CryptoError::DecodingError`] if the opened body is not valid base64
pub fn decrypt(key: &EncryptionKey, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    if ciphertext.len() < MIN_CIPHERTEXT_SIZE {
        return Err(CryptoError::CorruptCiphertext(
            "too short to contain nonce and authentication tag",
        ));
    }

    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_SIZE);
    let nonce = XNonce::from_slice(nonce_bytes);

    let encoded = cipher
        .decrypt(nonce, sealed)
        .map_err(|_| CryptoError::CorruptCiphertext("authentication failed"))?;

    STANDARD
        .decode(&encoded)
        .map_err(|e| CryptoError::DecodingError(e.to_string()))
}

/// Seals `plaintext` without the base64 step, for tests that need a payload
/// which authenticates but fails decoding.
#[cfg(test)]
fn encrypt_raw(key: &EncryptionKey, plaintext: &[u8]) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
    let mut result = nonce.to_vec();
    result.extend(cipher.encrypt(&nonce, plaintext).unwrap());
    result
}
