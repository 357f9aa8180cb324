use std::fmt;
use std::str::FromStr;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::errors::TokenError;

/// Opaque bearer token.
///
/// Sixteen bytes drawn from the operating system's CSPRNG. The value is both
/// the credential and its storage key; possession is the only check.
/// Text form is standard base64.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token([u8; Token::LENGTH]);

impl Token {
    /// Raw length in bytes.
    pub const LENGTH: usize = 16;

    /// Draw a fresh token from the OS random source.
    ///
    /// # Errors
    /// * `RandomSourceUnavailable` - The OS random source could not be read
    pub fn generate() -> Result<Self, TokenError> {
        let mut bytes = [0u8; Self::LENGTH];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::RandomSourceUnavailable(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Rebuild a token from a stored column value.
    ///
    /// # Errors
    /// * `InvalidLength` - Slice is not exactly 16 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TokenError> {
        <[u8; Self::LENGTH]>::try_from(bytes)
            .map(Self)
            .map_err(|_| TokenError::InvalidLength {
                expected: Self::LENGTH,
                actual: bytes.len(),
            })
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// Standard base64 text encoding, as carried in the auth cookie.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parse the text encoding produced by [`Token::encode`].
    ///
    /// # Errors
    /// * `InvalidEncoding` - Text is not standard base64
    /// * `InvalidLength` - Text decodes to anything other than 16 bytes
    pub fn decode(text: &str) -> Result<Self, TokenError> {
        let bytes = STANDARD
            .decode(text)
            .map_err(|e| TokenError::InvalidEncoding(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// Keeps token values out of logs that format with `{:?}`.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(..)")
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
