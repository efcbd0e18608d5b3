// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret redaction for log output and error messages.
//!
//! Two complementary mechanisms:
//! 1. **Exact-match**: plaintexts observed at decrypt time, registered at
//!    runtime and replaced wholesale.
//! 2. **Structural**: token-shaped (`K|<64 hex>`) and sealed-value-shaped
//!    (`V|<base64url>`) substrings are blanked even when the exact value
//!    was never registered.

use std::collections::HashSet;
use std::fmt::Display;
use std::io::Write;
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;
use tracing::debug;

/// The redaction placeholder.
pub const MASK: &str = "********";

/// Token-shaped substrings: `K|` followed by a 64-char lowercase hex digest.
static TOKEN_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"K\|[0-9a-f]{64}").unwrap());

/// Sealed-value-shaped substrings: `V|` followed by base64url characters.
static SEALED_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"V\|[A-Za-z0-9_-]+").unwrap());

/// Registry of secrets seen in plaintext, used to scrub outgoing text.
///
/// Explicit and injectable: tests instantiate isolated redactors, while
/// production shares one instance through the store. The set only grows;
/// there is no removal operation.
#[derive(Default)]
pub struct SecretRedactor {
    secrets: RwLock<HashSet<String>>,
}

impl SecretRedactor {
    /// Create an empty redactor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a plaintext secret for later masking.
    ///
    /// Values shorter than 2 characters are ignored: masking them would
    /// shred ordinary text on false positives.
    pub fn register(&self, secret: &str) {
        if secret.chars().count() < 2 {
            return;
        }
        let mut secrets = self.secrets.write().unwrap_or_else(|e| e.into_inner());
        if secrets.insert(secret.to_string()) {
            debug!(len = secret.len(), "registered secret for redaction");
        }
    }

    /// Number of registered secrets.
    pub fn len(&self) -> usize {
        self.secrets.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True if no secret has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every registered secret and every vault-shaped substring in
    /// `text` with the fixed mask.
    ///
    /// Idempotent: the mask never contains characters the patterns match.
    pub fn mask(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        // Snapshot under the read lock so concurrent registration cannot
        // invalidate the iteration. Exact matches go longest first, so a
        // short secret never splits a longer one.
        let mut secrets: Vec<String> = {
            let guard = self.secrets.read().unwrap_or_else(|e| e.into_inner());
            guard.iter().cloned().collect()
        };
        secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));

        let mut out = text.to_string();
        for secret in &secrets {
            out = out.replace(secret.as_str(), MASK);
        }
        out = TOKEN_SHAPE.replace_all(&out, "K|********").into_owned();
        out = SEALED_SHAPE.replace_all(&out, "V|********").into_owned();
        out
    }

    /// Mask the display form of each argument, for structured-log call
    /// sites that interpolate values into a message.
    pub fn mask_args<I>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        args.into_iter().map(|a| self.mask(&a.to_string())).collect()
    }
}

impl std::fmt::Debug for SecretRedactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRedactor")
            .field("registered", &self.len())
            .finish()
    }
}

/// A writer wrapper that masks secrets in everything written through it.
///
/// Wire this under a log or report sink so free text is scrubbed before it
/// reaches persistent output.
pub struct RedactingWriter<W> {
    inner: W,
    redactor: Arc<SecretRedactor>,
}

impl<W: Write> RedactingWriter<W> {
    /// Create a new redacting writer around `inner`.
    pub fn new(inner: W, redactor: Arc<SecretRedactor>) -> Self {
        Self { inner, redactor }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let masked = self.redactor.mask(&String::from_utf8_lossy(buf));
        self.inner.write_all(masked.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_registered_secret() {
        let redactor = SecretRedactor::new();
        redactor.register("hunter2");
        assert_eq!(
            redactor.mask("the password is hunter2, keep it safe"),
            "the password is ********, keep it safe"
        );
    }

    #[test]
    fn single_character_secrets_are_never_registered() {
        let redactor = SecretRedactor::new();
        redactor.register("x");
        redactor.register("");
        assert!(redactor.is_empty());
        assert_eq!(redactor.mask("x marks the spot"), "x marks the spot");
    }

    #[test]
    fn two_character_secrets_are_registered() {
        let redactor = SecretRedactor::new();
        redactor.register("ab");
        assert_eq!(redactor.len(), 1);
    }

    #[test]
    fn registering_twice_keeps_one_entry() {
        let redactor = SecretRedactor::new();
        redactor.register("hunter2");
        redactor.register("hunter2");
        assert_eq!(redactor.len(), 1);
    }

    #[test]
    fn masks_token_shapes_that_were_never_registered() {
        let redactor = SecretRedactor::new();
        let text = format!("leaked token K|{}", "a".repeat(64));
        let masked = redactor.mask(&text);
        assert_eq!(masked, "leaked token K|********");
        // No 64-hex-digit run survives.
        assert!(!masked.contains(&"a".repeat(64)));
    }

    #[test]
    fn masks_sealed_value_shapes() {
        let redactor = SecretRedactor::new();
        let masked = redactor.mask("entry was V|AgICAgICAgICAgICfZ4-IB_-udo in the log");
        assert_eq!(masked, "entry was V|******** in the log");
    }

    #[test]
    fn masking_is_idempotent() {
        let redactor = SecretRedactor::new();
        redactor.register("s3cr3t-value");
        let text = format!("v=s3cr3t-value t=K|{} s=V|abc_def-123", "0".repeat(64));
        let once = redactor.mask(&text);
        assert_eq!(redactor.mask(&once), once);
    }

    #[test]
    fn longer_secret_masks_before_its_prefix() {
        let redactor = SecretRedactor::new();
        redactor.register("short");
        redactor.register("short-longer");
        assert_eq!(redactor.mask("prefix short-longer suffix"), "prefix ******** suffix");
    }

    #[test]
    fn masks_every_occurrence() {
        let redactor = SecretRedactor::new();
        redactor.register("pw");
        assert_eq!(redactor.mask("pw and pw again"), "******** and ******** again");
    }

    #[test]
    fn passes_through_non_sensitive_text() {
        let redactor = SecretRedactor::new();
        redactor.register("hunter2");
        let text = "a normal log message with no secrets";
        assert_eq!(redactor.mask(text), text);
    }

    #[test]
    fn mask_args_masks_each_argument() {
        let redactor = SecretRedactor::new();
        redactor.register("hunter2");
        let masked = redactor.mask_args(["user=qa", "pass=hunter2"]);
        assert_eq!(masked, vec!["user=qa".to_string(), "pass=********".to_string()]);
    }

    #[test]
    fn concurrent_registration_loses_no_updates() {
        let redactor = Arc::new(SecretRedactor::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let redactor = Arc::clone(&redactor);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        redactor.register(&format!("secret-{i}-{j}"));
                        // Masking while other threads insert must not panic.
                        let _ = redactor.mask("probe secret-0-0 probe");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(redactor.len(), 8 * 50);
    }

    #[test]
    fn redacting_writer_scrubs_output() {
        let redactor = Arc::new(SecretRedactor::new());
        redactor.register("secret123");
        let mut buf = Vec::new();
        {
            let mut writer = RedactingWriter::new(&mut buf, Arc::clone(&redactor));
            write!(writer, "API response: secret123 received").unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output, "API response: ******** received");
    }

    #[test]
    fn debug_output_shows_count_not_contents() {
        let redactor = SecretRedactor::new();
        redactor.register("hunter2");
        let debug = format!("{redactor:?}");
        assert!(debug.contains("registered"));
        assert!(!debug.contains("hunter2"));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn masking_is_idempotent_for_any_text(text in ".*") {
                let redactor = SecretRedactor::new();
                redactor.register("hunter2");
                redactor.register("s3cr3t-value");
                let once = redactor.mask(&text);
                prop_assert_eq!(redactor.mask(&once), once);
            }

            #[test]
            fn masked_text_never_contains_a_token_digest(digest in "[0-9a-f]{64}") {
                let redactor = SecretRedactor::new();
                let masked = redactor.mask(&format!("tok=K|{digest}"));
                prop_assert!(!masked.contains(&digest));
            }
        }
    }
}
