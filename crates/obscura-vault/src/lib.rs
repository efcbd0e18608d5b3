// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted configuration vault: HKDF-derived keys, AES-256-GCM sealed
//! values, and token-based lookups.
//!
//! The on-disk vault never stores key names or values in plaintext. Both
//! subkeys are derived once per process from the `ENCRYPTION_KEY` master
//! secret; lookups present opaque `K|<hex>` tokens, and every decrypted
//! value is registered with the shared redactor before it is returned.

pub mod crypto;
pub mod kdf;
pub mod store;

pub use kdf::{derive_keys, DerivedKeys};
pub use store::{
    global, init, master_secret_from_env, value, SecretStore, DEFAULT_VAULT_PATH,
    MASTER_SECRET_ENV,
};
