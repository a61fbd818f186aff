//! Shareable locator tokens.
//!
//! # Wire Format
//!
//! `base address (46 bytes, plaintext) || sealed routing payload`, with no
//! separator. The fixed address length is the only framing. Text transport
//! uses lowercase hex of the whole token.

use bytes::{BufMut, Bytes, BytesMut};

use crate::address::{ADDRESS_LEN, ContentAddress};
use crate::error::{Error, Result};

/// Self-describing token that locates, authenticates and names a mirrored
/// file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    base: ContentAddress,
    payload: Bytes,
}

impl Locator {
    /// Packs a base address and a sealed routing payload.
    pub fn pack(base: ContentAddress, payload: impl Into<Bytes>) -> Self {
        Self {
            base,
            payload: payload.into(),
        }
    }

    /// Splits a raw token into its base address and sealed payload.
    ///
    /// Nothing is decrypted here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedLocator`] if the token is shorter than an
    /// address or its prefix is not a valid address.
    pub fn unpack(token: &[u8]) -> Result<Self> {
        if token.len() < ADDRESS_LEN {
            return Err(Error::malformed_locator(format!(
                "token is {} bytes, shorter than the {ADDRESS_LEN} byte address",
                token.len()
            )));
        }

        let (address, payload) = token.split_at(ADDRESS_LEN);
        let address = std::str::from_utf8(address)
            .map_err(|_| Error::malformed_locator("address prefix is not UTF-8"))?;

        Ok(Self {
            base: ContentAddress::parse(address)?,
            payload: Bytes::copy_from_slice(payload),
        })
    }

    /// Parses a hex-encoded token.
    pub fn from_hex(text: &str) -> Result<Self> {
        let token = hex::decode(text.trim())
            .map_err(|e| Error::malformed_locator(format!("token is not valid hex: {e}")))?;
        Self::unpack(&token)
    }

    /// Base address of the mirrored file.
    pub fn base(&self) -> &ContentAddress {
        &self.base
    }

    /// Sealed routing payload.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Serializes the token.
    pub fn to_bytes(&self) -> Bytes {
        let mut token = BytesMut::with_capacity(ADDRESS_LEN + self.payload.len());
        token.put_slice(self.base.as_bytes());
        token.put_slice(&self.payload);
        token.freeze()
    }

    /// Serializes the token as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Locator {
        Locator::pack(
            ContentAddress::digest(b"original file"),
            vec![0xDE, 0xAD, 0xBE, 0xEF, b',', 0x00],
        )
    }

    #[test]
    fn token_starts_with_plain_address() {
        let locator = sample();
        let token = locator.to_bytes();
        assert_eq!(&token[..ADDRESS_LEN], locator.base().as_bytes());
        assert_eq!(&token[ADDRESS_LEN..], locator.payload().as_ref());
    }

    #[test]
    fn unpack_roundtrip() {
        let locator = sample();
        assert_eq!(Locator::unpack(&locator.to_bytes()).unwrap(), locator);
        assert_eq!(Locator::from_hex(&locator.to_hex()).unwrap(), locator);
    }

    #[test]
    fn address_only_token_has_empty_payload() {
        let base = ContentAddress::digest(b"x");
        let locator = Locator::unpack(base.as_bytes()).unwrap();
        assert!(locator.payload().is_empty());
    }

    #[test]
    fn short_token_is_malformed() {
        let result = Locator::unpack(b"QmTooShort");
        assert!(matches!(result, Err(Error::MalformedLocator(_))));
    }

    #[test]
    fn bad_address_is_malformed() {
        let mut token = vec![b'Z'; ADDRESS_LEN];
        token.extend_from_slice(b"payload");
        assert!(matches!(
            Locator::unpack(&token),
            Err(Error::MalformedLocator(_))
        ));

        let mut token = vec![0xFF; ADDRESS_LEN];
        token.push(1);
        assert!(Locator::unpack(&token).is_err());
    }

    #[test]
    fn invalid_hex_is_malformed() {
        assert!(matches!(
            Locator::from_hex("not hex"),
            Err(Error::MalformedLocator(_))
        ));
    }
}
