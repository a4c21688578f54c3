// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Vault key resolution: environment variable, then file-backed, then generate.

use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

pub const KEY_BYTES: usize = 32;

/// Name of the environment variable that overrides the file-backed key.
pub const SECRETS_KEY_ENV: &str = "DASHBOARD_SECRETS_KEY";

/// Normalize key material supplied as raw bytes, `base64:`-prefixed,
/// `hex:`-prefixed, or arbitrary text (hashed through SHA-256) into exactly
/// 32 bytes.
pub fn normalize_key_material(raw: &str) -> [u8; KEY_BYTES] {
    let decoded: Option<Vec<u8>> = if let Some(rest) = raw.strip_prefix("base64:") {
        base64::engine::general_purpose::STANDARD.decode(rest).ok()
    } else if let Some(rest) = raw.strip_prefix("hex:") {
        decode_hex(rest)
    } else if raw.len() == KEY_BYTES {
        Some(raw.as_bytes().to_vec())
    } else {
        None
    };

    match decoded {
        Some(bytes) if bytes.len() == KEY_BYTES => {
            let mut out = [0u8; KEY_BYTES];
            out.copy_from_slice(&bytes);
            out
        }
        _ => {
            let mut hasher = Sha256::new();
            hasher.update(raw.as_bytes());
            let digest = hasher.finalize();
            let mut out = [0u8; KEY_BYTES];
            out.copy_from_slice(&digest);
            out
        }
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Resolve the vault's encryption key: env var first, then a file at
/// `key_path`, generating (and persisting with 0600 perms) a fresh random
/// key if neither is present.
pub fn resolve_key(key_path: &Path) -> io::Result<[u8; KEY_BYTES]> {
    if let Ok(from_env) = std::env::var(SECRETS_KEY_ENV) {
        if !from_env.trim().is_empty() {
            return Ok(normalize_key_material(from_env.trim()));
        }
    }

    if let Ok(contents) = fs::read_to_string(key_path) {
        if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(contents.trim()) {
            if bytes.len() == KEY_BYTES {
                let mut out = [0u8; KEY_BYTES];
                out.copy_from_slice(&bytes);
                return Ok(out);
            }
        }
        tracing::warn!(path = %key_path.display(), "vault key file unreadable, regenerating");
    }

    let mut key = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut key);
    write_key_file(key_path, &key)?;
    Ok(key)
}

fn write_key_file(path: &Path, key: &[u8; KEY_BYTES]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let encoded = base64::engine::general_purpose::STANDARD.encode(key);
    fs::write(path, encoded)?;
    set_owner_only_perms(path)?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only_perms(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_owner_only_perms(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
