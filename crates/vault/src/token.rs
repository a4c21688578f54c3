// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Versioned AES-256-GCM token format: `fyv1.<iv>.<tag>.<ciphertext>` (base64
//! parts). One encryption per call uses a fresh random 12-byte IV.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine as _;
use rand::RngCore;
use thiserror::Error;

/// Prefix identifying the token format/version. Bumping this would let a
/// future cipher change coexist with tokens written by this version.
pub const TOKEN_PREFIX: &str = "fyv1.";
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed")]
    Decrypt,
}

/// Is this string shaped like a token this vault produced? Used to decide
/// whether a value needs decrypting or is legacy plaintext.
pub fn is_encrypted(token: &str) -> bool {
    token.starts_with(TOKEN_PREFIX) && token.matches('.').count() == 3
}

/// Encrypt `plaintext` under `key` (must be 32 bytes), returning a token of
/// the form `fyv1.<base64 iv>.<base64 tag>.<base64 ciphertext>`.
pub fn encrypt(key: &[u8; 32], plaintext: &str) -> Result<String, VaultError> {
    let cipher = Aes256Gcm::new(key.into());
    let mut iv_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut iv_bytes);
    let nonce = Nonce::from_slice(&iv_bytes);

    let mut sealed = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext.as_bytes(),
                aad: b"",
            },
        )
        .map_err(|_| VaultError::Encrypt)?;

    // `encrypt` appends the 16-byte tag to the ciphertext; split it out so
    // the wire format carries iv/tag/ciphertext as three independent parts.
    if sealed.len() < TAG_LEN {
        return Err(VaultError::Encrypt);
    }
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    let engine = &base64::engine::general_purpose::STANDARD;
    Ok(format!(
        "{TOKEN_PREFIX}{}.{}.{}",
        engine.encode(iv_bytes),
        engine.encode(tag),
        engine.encode(sealed),
    ))
}

/// Decrypt a token produced by [`encrypt`]. Returns `None` if the token is
/// not shaped like ours, or if the key/tag don't match — callers that want
/// the "never throws, returns original token" tolerance described in the
/// vault's contract apply that at the call site (see `Vault::decrypt`).
pub fn decrypt(key: &[u8; 32], token: &str) -> Option<String> {
    if !is_encrypted(token) {
        return None;
    }
    let rest = &token[TOKEN_PREFIX.len()..];
    let mut parts = rest.splitn(3, '.');
    let iv_b64 = parts.next()?;
    let tag_b64 = parts.next()?;
    let ct_b64 = parts.next()?;

    let engine = &base64::engine::general_purpose::STANDARD;
    let iv = engine.decode(iv_b64).ok()?;
    let tag = engine.decode(tag_b64).ok()?;
    let ciphertext = engine.decode(ct_b64).ok()?;
    if iv.len() != NONCE_LEN || tag.len() != TAG_LEN {
        return None;
    }

    let mut sealed = ciphertext;
    sealed.extend_from_slice(&tag);

    let cipher = Aes256Gcm::new(key.into());
    let nonce = Nonce::from_slice(&iv);
    let plaintext = cipher
        .decrypt(
            nonce,
            Payload {
                msg: &sealed,
                aad: b"",
            },
        )
        .ok()?;
    String::from_utf8(plaintext).ok()
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
