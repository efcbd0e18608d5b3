// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed boundary for vault artifacts.
//!
//! The on-disk vault is a prefix-tagged text format: key tokens render as
//! `K|<64 lowercase hex>` and sealed values as `V|<base64url, no padding>`.
//! Parsing into these newtypes on the load path makes a malformed prefix
//! unrepresentable everywhere past it.

use std::fmt;
use std::str::FromStr;

use crate::ObscuraError;

/// Prefix tagging a key-name token.
pub const TOKEN_PREFIX: &str = "K|";

/// Prefix tagging a sealed value.
pub const SEALED_PREFIX: &str = "V|";

/// Length of the hex digest carried by a token (HMAC-SHA256, hex-encoded).
pub const TOKEN_DIGEST_LEN: usize = 64;

/// An opaque lookup token: the lowercase-hex HMAC-SHA256 digest of a
/// conceptual key name.
///
/// Tokens are deterministic under one MAC key and non-reversible. They are
/// not portable across different master secrets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Wrap a digest, validating that it is exactly 64 lowercase hex chars.
    pub fn from_digest(digest: impl Into<String>) -> Result<Self, ObscuraError> {
        let digest = digest.into();
        let valid = digest.len() == TOKEN_DIGEST_LEN
            && digest
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if valid {
            Ok(Self(digest))
        } else {
            Err(ObscuraError::Format(format!(
                "token digest must be {TOKEN_DIGEST_LEN} lowercase hex characters"
            )))
        }
    }

    /// The hex digest without the `K|` prefix.
    pub fn digest(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TOKEN_PREFIX}{}", self.0)
    }
}

impl FromStr for Token {
    type Err = ObscuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digest = s.strip_prefix(TOKEN_PREFIX).ok_or_else(|| {
            ObscuraError::Format(format!("token must start with {TOKEN_PREFIX:?}"))
        })?;
        Self::from_digest(digest)
    }
}

/// A sealed value: nonce-prefixed, authenticated-encrypted, encoded as
/// base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedValue(String);

impl SealedValue {
    /// Wrap an encoded blob, validating the base64url character set.
    ///
    /// Only the charset is checked here; whether the blob decodes to a
    /// well-formed nonce/ciphertext/tag layout is the codec's concern.
    pub fn from_encoded(body: impl Into<String>) -> Result<Self, ObscuraError> {
        let body = body.into();
        let valid = !body.is_empty()
            && body
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if valid {
            Ok(Self(body))
        } else {
            Err(ObscuraError::Format(
                "sealed value must be non-empty base64url without padding".to_string(),
            ))
        }
    }

    /// The base64url body without the `V|` prefix.
    pub fn encoded(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SealedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SEALED_PREFIX}{}", self.0)
    }
}

impl FromStr for SealedValue {
    type Err = ObscuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix(SEALED_PREFIX).ok_or_else(|| {
            ObscuraError::Format(format!("sealed value must start with {SEALED_PREFIX:?}"))
        })?;
        Self::from_encoded(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "14409d451267f19849ab970530f92e0300048b200038e9785d355f8331652d6e";

    #[test]
    fn token_parses_and_displays_with_prefix() {
        let token: Token = format!("K|{DIGEST}").parse().unwrap();
        assert_eq!(token.digest(), DIGEST);
        assert_eq!(token.to_string(), format!("K|{DIGEST}"));
    }

    #[test]
    fn token_rejects_missing_prefix() {
        let result = Token::from_str(DIGEST);
        assert!(matches!(result, Err(ObscuraError::Format(_))));
    }

    #[test]
    fn token_rejects_wrong_prefix() {
        let result = Token::from_str(&format!("V|{DIGEST}"));
        assert!(matches!(result, Err(ObscuraError::Format(_))));
    }

    #[test]
    fn token_rejects_uppercase_hex() {
        let upper = DIGEST.to_uppercase();
        assert!(Token::from_str(&format!("K|{upper}")).is_err());
    }

    #[test]
    fn token_rejects_short_digest() {
        assert!(Token::from_str("K|abc123").is_err());
    }

    #[test]
    fn token_rejects_non_hex_characters() {
        let mut digest = DIGEST.to_string();
        digest.replace_range(0..1, "g");
        assert!(Token::from_digest(digest).is_err());
    }

    #[test]
    fn sealed_value_parses_and_displays_with_prefix() {
        let sealed: SealedValue = "V|AgICAgIC_fZ4-IB".parse().unwrap();
        assert_eq!(sealed.encoded(), "AgICAgIC_fZ4-IB");
        assert_eq!(sealed.to_string(), "V|AgICAgIC_fZ4-IB");
    }

    #[test]
    fn sealed_value_rejects_missing_prefix() {
        assert!(SealedValue::from_str("AgICAgIC").is_err());
    }

    #[test]
    fn sealed_value_rejects_empty_body() {
        assert!(SealedValue::from_str("V|").is_err());
    }

    #[test]
    fn sealed_value_rejects_standard_base64_characters() {
        // '+' and '/' belong to the standard alphabet, not base64url.
        assert!(SealedValue::from_str("V|abc+def").is_err());
        assert!(SealedValue::from_str("V|abc/def").is_err());
        // Padding is not allowed either.
        assert!(SealedValue::from_str("V|abcd=").is_err());
    }
}
