// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HKDF-SHA256 key derivation from the master secret.
//!
//! One extract over a fixed domain-separation salt, then two expands with
//! distinct info strings. Deterministic by construction: tokens and sealed
//! values must stay readable across process restarts, so no per-call
//! randomness is allowed here.

use obscura_core::ObscuraError;
use ring::hkdf;
use zeroize::Zeroizing;

/// Size of each derived subkey in bytes.
pub const KEY_LEN: usize = 32;

/// Fixed domain-separation salt. Not secret; it binds the derivation to
/// this application.
const HKDF_SALT: &[u8] = b"obscura.salt.v1";

/// Info string for the token MAC key.
const INFO_MAC: &[u8] = b"key-hmac";

/// Info string for the value encryption key.
const INFO_ENC: &[u8] = b"val-aesgcm";

/// The two independent subkeys derived from the master secret.
///
/// Produced once per process and held for its lifetime by the store.
/// Debug output intentionally omits the key material.
pub struct DerivedKeys {
    mac_key: Zeroizing<[u8; KEY_LEN]>,
    enc_key: Zeroizing<[u8; KEY_LEN]>,
}

impl DerivedKeys {
    /// Key for HMAC tokens of key names.
    pub fn mac_key(&self) -> &[u8; KEY_LEN] {
        &self.mac_key
    }

    /// Key for AES-256-GCM sealing of values.
    pub fn enc_key(&self) -> &[u8; KEY_LEN] {
        &self.enc_key
    }
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys")
            .field("mac_key", &"[REDACTED]")
            .field("enc_key", &"[REDACTED]")
            .finish()
    }
}

/// Derive the MAC key and the encryption key from the master secret.
///
/// The two keys come from separate HKDF expands and are never derived from
/// each other. Callers should drop (zeroize) their copy of the master
/// secret as soon as this returns.
pub fn derive_keys(master_secret: &[u8]) -> Result<DerivedKeys, ObscuraError> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, HKDF_SALT).extract(master_secret);

    let mut mac_key = Zeroizing::new([0u8; KEY_LEN]);
    let mut enc_key = Zeroizing::new([0u8; KEY_LEN]);
    expand_into(&prk, INFO_MAC, mac_key.as_mut())?;
    expand_into(&prk, INFO_ENC, enc_key.as_mut())?;

    Ok(DerivedKeys { mac_key, enc_key })
}

/// Single HKDF expand with one info string, filling `out`.
fn expand_into(prk: &hkdf::Prk, info: &[u8], out: &mut [u8]) -> Result<(), ObscuraError> {
    struct OkmLen(usize);
    impl hkdf::KeyType for OkmLen {
        fn len(&self) -> usize {
            self.0
        }
    }

    prk.expand(&[info], OkmLen(out.len()))
        .and_then(|okm| okm.fill(out))
        .map_err(|_| ObscuraError::Crypto("HKDF-SHA256 expand failed".to_string()))
}
