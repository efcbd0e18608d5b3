// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AEAD seal/open for vault values and keyed-hash tokenization of key names.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the
//! system CSPRNG and prepends it to the ciphertext, since the codec is
//! stateless between calls. Nonce reuse would be catastrophic for GCM
//! security.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use obscura_core::{ObscuraError, SealedValue, Token};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};

use crate::kdf::KEY_LEN;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Compute the lookup token for a conceptual key name.
///
/// Deterministic under one MAC key: equal names always produce equal
/// tokens. Tokens computed under different master secrets never match.
pub fn tokenize(mac_key: &[u8; KEY_LEN], name: &str) -> Token {
    let key = hmac::Key::new(hmac::HMAC_SHA256, mac_key);
    let digest = hmac::sign(&key, name.as_bytes());
    Token::from_digest(hex::encode(digest.as_ref()))
        .expect("a hex-encoded SHA-256 digest is always a valid token")
}

/// Encrypt a plaintext into a sealed value.
///
/// Non-determinism is intentional: repeated sealing of the same plaintext
/// yields different outputs because the nonce is fresh per call. The blob
/// layout is `nonce || ciphertext || tag`, encoded base64url without padding.
pub fn seal(enc_key: &[u8; KEY_LEN], plaintext: &str) -> Result<SealedValue, ObscuraError> {
    let key = aead_key(enc_key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| ObscuraError::Crypto("failed to generate random nonce".to_string()))?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: the plaintext buffer is extended with the tag.
    let mut in_out = plaintext.as_bytes().to_vec();
    key.seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| ObscuraError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + in_out.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&in_out);

    SealedValue::from_encoded(URL_SAFE_NO_PAD.encode(blob))
}

/// Decrypt a sealed value.
///
/// Structural problems (bad base64, truncated blob, non-UTF-8 plaintext)
/// are `Format` errors. A failed authentication tag is an `Integrity`
/// error and must never be read as "value absent".
pub fn open(enc_key: &[u8; KEY_LEN], sealed: &SealedValue) -> Result<String, ObscuraError> {
    let blob = URL_SAFE_NO_PAD
        .decode(sealed.encoded())
        .map_err(|e| ObscuraError::Format(format!("sealed value is not valid base64url: {e}")))?;
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(ObscuraError::Format(format!(
            "sealed blob is {} bytes, need at least {}",
            blob.len(),
            NONCE_LEN + TAG_LEN
        )));
    }

    let key = aead_key(enc_key)?;
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| ObscuraError::Format("invalid nonce length".to_string()))?;

    let mut in_out = ciphertext.to_vec();
    let plaintext = key.open_in_place(nonce, Aad::empty(), &mut in_out).map_err(|_| {
        ObscuraError::Integrity(
            "AES-256-GCM tag verification failed -- tampered data or wrong key".to_string(),
        )
    })?;

    String::from_utf8(plaintext.to_vec())
        .map_err(|e| ObscuraError::Format(format!("decrypted value is not valid UTF-8: {e}")))
}

fn aead_key(enc_key: &[u8; KEY_LEN]) -> Result<LessSafeKey, ObscuraError> {
    let unbound = UnboundKey::new(&AES_256_GCM, enc_key)
        .map_err(|_| ObscuraError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}
