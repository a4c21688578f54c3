// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Per-pipeline encrypted secret storage: `data/secrets/<pipelineId>.json`.

use crate::key::resolve_key;
use crate::token::{decrypt, encrypt};
use fyreflow_core::is_sensitive_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultStoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SecretFile {
    #[serde(flatten)]
    entries: HashMap<String, String>,
}

/// The secrets vault (C1): resolves an encryption key once at construction
/// and exposes encrypt/decrypt plus per-pipeline save/forget/read.
///
/// Key resolution happens exactly once in [`Vault::open`] — the vault is
/// constructed a single time at daemon startup and shared behind an `Arc`,
/// matching the "process-global singleton, deterministic load order"
/// requirement.
pub struct Vault {
    key: [u8; 32],
    secrets_dir: PathBuf,
}

impl Vault {
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        let key_path = data_dir.join(".secrets-key");
        let key = resolve_key(&key_path)?;
        let secrets_dir = data_dir.join("secrets");
        fs::create_dir_all(&secrets_dir)?;
        Ok(Self { key, secrets_dir })
    }

    #[cfg(test)]
    pub fn with_key_for_test(secrets_dir: PathBuf, key: [u8; 32]) -> Self {
        Self { key, secrets_dir }
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        encrypt(&self.key, plaintext).unwrap_or_else(|_| plaintext.to_string())
    }

    pub fn is_encrypted(&self, token: &str) -> bool {
        crate::token::is_encrypted(token)
    }

    /// Decrypt a token. Never throws: a token that doesn't decrypt (wrong
    /// key, corrupt, or genuinely not one of ours) is returned unchanged so
    /// legacy/plaintext values stay usable, just opaque.
    pub fn decrypt(&self, token: &str) -> String {
        decrypt(&self.key, token).unwrap_or_else(|| token.to_string())
    }

    fn path_for(&self, pipeline_id: &str) -> PathBuf {
        self.secrets_dir.join(format!("{pipeline_id}.json"))
    }

    /// Encrypt and persist `values` for `pipeline_id`, merging with any
    /// existing entries (new keys overwrite, others are preserved).
    pub fn save(
        &self,
        pipeline_id: &str,
        values: &HashMap<String, String>,
    ) -> Result<(), VaultStoreError> {
        let mut file = self.load_file(pipeline_id)?;
        for (key, plaintext) in values {
            file.entries.insert(key.clone(), self.encrypt(plaintext));
        }
        self.write_file(pipeline_id, &file)
    }

    /// Remove the given keys for a pipeline. No-op for keys that aren't present.
    pub fn forget(&self, pipeline_id: &str, keys: &[String]) -> Result<(), VaultStoreError> {
        let mut file = self.load_file(pipeline_id)?;
        for key in keys {
            file.entries.remove(key);
        }
        self.write_file(pipeline_id, &file)
    }

    /// Remove every secret for a pipeline (used when the pipeline itself is deleted).
    pub fn purge(&self, pipeline_id: &str) -> Result<(), VaultStoreError> {
        let path = self.path_for(pipeline_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Decrypt and return every stored value for a pipeline, keyed by input name.
    pub fn read(&self, pipeline_id: &str) -> Result<HashMap<String, String>, VaultStoreError> {
        let file = self.load_file(pipeline_id)?;
        Ok(file
            .entries
            .into_iter()
            .map(|(k, v)| (k.clone(), self.decrypt(&v)))
            .collect())
    }

    /// Which keys are currently stored for a pipeline, without decrypting them.
    pub fn stored_keys(&self, pipeline_id: &str) -> Result<Vec<String>, VaultStoreError> {
        Ok(self.load_file(pipeline_id)?.entries.into_keys().collect())
    }

    fn load_file(&self, pipeline_id: &str) -> Result<SecretFile, VaultStoreError> {
        let path = self.path_for(pipeline_id);
        if !path.exists() {
            return Ok(SecretFile::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_file(&self, pipeline_id: &str, file: &SecretFile) -> Result<(), VaultStoreError> {
        let path = self.path_for(pipeline_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(file)?)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

/// Mask any sensitive-keyed value in a map with [`fyreflow_core::SECURE_SENTINEL`],
/// for surfacing run inputs back to the editor without leaking plaintext.
pub fn mask_sensitive(inputs: &HashMap<String, String>) -> HashMap<String, String> {
    inputs
        .iter()
        .map(|(k, v)| {
            if is_sensitive_key(k) {
                (k.clone(), fyreflow_core::SECURE_SENTINEL.to_string())
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
