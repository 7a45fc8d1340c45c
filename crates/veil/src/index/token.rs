//! Deterministic keyword tokens.
//!
//! A token is `HMAC-SHA256(token_key, keyword)`. The same keyword always maps
//! to the same token under a given key, so anyone observing the inverted index
//! learns which sessions share a keyword, though not the keyword itself.

use crate::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt::{self, Debug};

type HmacSha256 = Hmac<Sha256>;

/// Size in bytes of a keyword token and of the token key.
pub const TOKEN_BYTES: usize = 32;

/// A deterministic keyword token, the key of the inverted index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeywordToken([u8; TOKEN_BYTES]);

impl KeywordToken {
    /// Returns the bytes of the token.
    pub fn as_bytes(&self) -> &[u8; TOKEN_BYTES] {
        &self.0
    }

    /// Create a token from its bytes, if the length is correct.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }
}

impl Debug for KeywordToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeywordToken(")?;
        for b in &self.0[..8] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "..)")
    }
}

/// Keyed deterministic transform from keywords to tokens.
#[derive(Clone)]
pub struct KeywordTokenizer {
    mac: HmacSha256,
}

impl Debug for KeywordTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordTokenizer").finish_non_exhaustive()
    }
}

impl KeywordTokenizer {
    /// Create a tokenizer from a secret key.
    pub fn new(key: &[u8; TOKEN_BYTES]) -> Result<Self> {
        let mac = <HmacSha256 as Mac>::new_from_slice(key)
            .map_err(|_| Error::invalid_parameter("Invalid keyword token key"))?;
        Ok(Self { mac })
    }

    /// Compute the token of `keyword`.
    pub fn tokenize(&self, keyword: &str) -> KeywordToken {
        let mut mac = self.mac.clone();
        mac.update(keyword.as_bytes());
        KeywordToken(mac.finalize().into_bytes().into())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeywordToken, KeywordTokenizer, TOKEN_BYTES};
    use std::error::Error as StdError;

    #[test]
    fn deterministic() -> Result<(), Box<dyn StdError>> {
        let tokenizer = KeywordTokenizer::new(&[7u8; TOKEN_BYTES])?;
        assert_eq!(tokenizer.tokenize("project"), tokenizer.tokenize("project"));
        assert_ne!(tokenizer.tokenize("project"), tokenizer.tokenize("Project"));
        assert_ne!(tokenizer.tokenize("project"), tokenizer.tokenize("alpha"));
        Ok(())
    }

    #[test]
    fn keyed() -> Result<(), Box<dyn StdError>> {
        let a = KeywordTokenizer::new(&[1u8; TOKEN_BYTES])?;
        let b = KeywordTokenizer::new(&[2u8; TOKEN_BYTES])?;
        assert_ne!(a.tokenize("project"), b.tokenize("project"));
        Ok(())
    }

    #[test]
    fn from_slice() -> Result<(), Box<dyn StdError>> {
        let token = KeywordTokenizer::new(&[0u8; TOKEN_BYTES])?.tokenize("");
        assert_eq!(KeywordToken::from_slice(token.as_bytes()), Some(token));
        assert_eq!(KeywordToken::from_slice(&[0u8; 31]), None);
        Ok(())
    }
}
