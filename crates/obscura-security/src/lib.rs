// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret redaction for the Obscura configuration vault.
//!
//! Scrubs decrypted values and vault-shaped substrings out of any text
//! headed for persistent output (logs, reports, error messages).

pub mod redact;

pub use redact::{RedactingWriter, SecretRedactor, MASK};
