// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Obscura configuration vault.

use thiserror::Error;

/// The primary error type used across all Obscura crates.
///
/// Every variant is non-retryable: repeating a failed derivation or
/// decryption with the same inputs cannot succeed.
#[derive(Debug, Error)]
pub enum ObscuraError {
    /// Configuration errors (missing or undecodable master secret,
    /// unreadable vault file). Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed vault data (bad token or sealed-value shape, bad base64,
    /// truncated blob, non-UTF-8 plaintext). Fatal for the affected entry;
    /// the rest of the vault keeps serving.
    #[error("format error: {0}")]
    Format(String),

    /// Authentication-tag verification failure. Signals tampering or a key
    /// mismatch and must never be treated as an absent value.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Cryptographic primitive failure (key derivation, cipher setup,
    /// CSPRNG). A compromised derivation corrupts every subsequent lookup,
    /// so these abort initialization.
    #[error("crypto error: {0}")]
    Crypto(String),
}
