//! Symmetric encryption for chunk bodies and routing payloads.
//!
//! Ciphertexts are self-contained: a fresh random nonce is generated for
//! every call and prepended to the output, so two encryptions of the same
//! plaintext never match while decryption needs nothing but the key.
//!
//! # Example
//!
//! ```rust
//! use cairn_core::crypto::{EncryptionKey, decrypt, encrypt};
//!
//! let key = EncryptionKey::generate();
//! let ciphertext = encrypt(&key, b"chunk body").unwrap();
//! let plaintext = decrypt(&key, &ciphertext).unwrap();
//! assert_eq!(plaintext, b"chunk body");
//! ```

mod cipher;
mod error;
mod key;

pub use cipher::{MIN_CIPHERTEXT_SIZE, NONCE_SIZE, TAG_SIZE, decrypt, encrypt};
pub use error::{CryptoError, CryptoResult};
pub use key::{EncryptionKey, KEY_SIZE};
