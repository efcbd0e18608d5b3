// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret store: load-once vault state and token-based lookups.
//!
//! The store reads the master secret from `ENCRYPTION_KEY`, derives the
//! two subkeys, and parses the packaged vault file. After load the entry
//! map and keys are immutable; every decrypted value is registered with
//! the shared redactor before it is returned to the caller.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use obscura_core::{ObscuraError, SealedValue, Token};
use obscura_security::SecretRedactor;
use secrecy::SecretString;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf::{self, DerivedKeys};

/// Environment variable carrying the base64-encoded master secret.
pub const MASTER_SECRET_ENV: &str = "ENCRYPTION_KEY";

/// Vault resource path, fixed at build time.
pub const DEFAULT_VAULT_PATH: &str = ".env.sec";

/// The loaded vault: derived keys, the sealed entry map, and the shared
/// redactor. Immutable after construction, so lookups need no locking.
pub struct SecretStore {
    keys: DerivedKeys,
    entries: HashMap<Token, SealedValue>,
    redactor: Arc<SecretRedactor>,
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore")
            .field("keys", &self.keys)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl SecretStore {
    /// Load the store from `ENCRYPTION_KEY` and the default vault file.
    pub fn load() -> Result<Self, ObscuraError> {
        Self::load_from_path(Path::new(DEFAULT_VAULT_PATH), Arc::new(SecretRedactor::new()))
    }

    /// Load from an explicit vault file, reading the master secret from
    /// the environment.
    pub fn load_from_path(
        path: &Path,
        redactor: Arc<SecretRedactor>,
    ) -> Result<Self, ObscuraError> {
        let master = master_secret_from_env()?;
        let file = std::fs::File::open(path).map_err(|e| {
            ObscuraError::Config(format!("vault file {} not readable: {e}", path.display()))
        })?;
        let store = Self::from_reader(&master, BufReader::new(file), redactor)?;
        info!(path = %path.display(), entries = store.len(), "vault loaded");
        Ok(store)
    }

    /// Build a store from raw master-secret bytes and a vault reader.
    ///
    /// Touches no process globals; tests and offline tooling use this
    /// directly.
    pub fn from_reader(
        master_secret: &[u8],
        reader: impl BufRead,
        redactor: Arc<SecretRedactor>,
    ) -> Result<Self, ObscuraError> {
        let keys = kdf::derive_keys(master_secret)?;
        let entries = parse_entries(reader)?;
        Ok(Self {
            keys,
            entries,
            redactor,
        })
    }

    /// Decrypt the value stored under `token`.
    ///
    /// An unknown token is not an error: callers treat missing keys as
    /// optional configuration. A present entry that fails tag verification
    /// is a hard [`ObscuraError::Integrity`] failure.
    pub fn get(&self, token: &Token) -> Result<Option<SecretString>, ObscuraError> {
        let Some(sealed) = self.entries.get(token) else {
            debug!(token = %self.redactor.mask(&token.to_string()), "token not in vault");
            return Ok(None);
        };
        let plaintext = crypto::open(self.keys.enc_key(), sealed)?;
        self.redactor.register(&plaintext);
        Ok(Some(SecretString::from(plaintext)))
    }

    /// Compute the lookup token for a conceptual key name.
    ///
    /// Provisioning-side convenience; the hot lookup path never sees
    /// plaintext key names.
    pub fn token_for_name(&self, name: &str) -> Token {
        crypto::tokenize(self.keys.mac_key(), name)
    }

    /// Seal a plaintext into a vault-ready value. Provisioning-side.
    pub fn seal_value(&self, plaintext: &str) -> Result<SealedValue, ObscuraError> {
        crypto::seal(self.keys.enc_key(), plaintext)
    }

    /// The redactor every decrypted value is registered with.
    pub fn redactor(&self) -> &Arc<SecretRedactor> {
        &self.redactor
    }

    /// Number of entries loaded from the vault file.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the vault file contained no usable entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the stored tokens, for offline verification tooling.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.entries.keys()
    }
}

/// Read and decode the master secret from the environment.
///
/// Absence, a blank value, or undecodable base64 are configuration errors:
/// fatal at startup, never retried. The returned buffer zeroizes on drop.
pub fn master_secret_from_env() -> Result<Zeroizing<Vec<u8>>, ObscuraError> {
    let b64 = std::env::var(MASTER_SECRET_ENV)
        .map_err(|_| ObscuraError::Config(format!("{MASTER_SECRET_ENV} is not set")))?;
    if b64.trim().is_empty() {
        return Err(ObscuraError::Config(format!("{MASTER_SECRET_ENV} is empty")));
    }
    let master = STANDARD.decode(b64.trim()).map_err(|e| {
        ObscuraError::Config(format!("{MASTER_SECRET_ENV} is not valid base64: {e}"))
    })?;
    Ok(Zeroizing::new(master))
}

/// Parse `token = sealed-value` lines.
///
/// Blank lines and `#` comments are ignored. The first `=` splits token
/// from value; both sides are trimmed. A malformed line is skipped with a
/// warning so one bad entry cannot take down an otherwise valid vault.
/// A duplicate token keeps the later entry.
fn parse_entries(reader: impl BufRead) -> Result<HashMap<Token, SealedValue>, ObscuraError> {
    let mut entries = HashMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line =
            line.map_err(|e| ObscuraError::Config(format!("failed to read vault file: {e}")))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((raw_token, raw_value)) = line.split_once('=') else {
            warn!(line = idx + 1, "skipping vault line without '='");
            continue;
        };
        let token = match Token::from_str(raw_token.trim()) {
            Ok(token) => token,
            Err(e) => {
                warn!(line = idx + 1, error = %e, "skipping vault line with malformed token");
                continue;
            }
        };
        let value = match SealedValue::from_str(raw_value.trim()) {
            Ok(value) => value,
            Err(e) => {
                warn!(line = idx + 1, error = %e, "skipping vault line with malformed value");
                continue;
            }
        };
        if entries.insert(token, value).is_some() {
            warn!(line = idx + 1, "duplicate vault token -- keeping the later entry");
        }
    }
    Ok(entries)
}

static GLOBAL: OnceLock<SecretStore> = OnceLock::new();
static GLOBAL_INIT: Mutex<()> = Mutex::new(());

/// The process-wide store, loading it on first use.
///
/// Double-checked: the mutex serializes the single `load()`, and every
/// later call returns the already-initialized instance without locking.
pub fn global() -> Result<&'static SecretStore, ObscuraError> {
    if let Some(store) = GLOBAL.get() {
        return Ok(store);
    }
    let _guard = GLOBAL_INIT.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(store) = GLOBAL.get() {
        return Ok(store);
    }
    let store = SecretStore::load()?;
    Ok(GLOBAL.get_or_init(|| store))
}

/// Explicit bootstrap, same as the first call to [`global`].
///
/// Invoke early so a bad configuration fails at startup rather than at the
/// first lookup.
pub fn init() -> Result<(), ObscuraError> {
    global().map(|_| ())
}

/// Convenience lookup against the process-wide store.
///
/// A string that does not even parse as a token cannot name any stored
/// entry, so it yields absent like any other unknown token.
pub fn value(token: &str) -> Result<Option<SecretString>, ObscuraError> {
    let store = global()?;
    match Token::from_str(token) {
        Ok(token) => store.get(&token),
        Err(_) => {
            debug!("lookup with malformed token string");
            Ok(None)
        }
    }
}
