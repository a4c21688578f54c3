// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fyreflow-vault: AES-256-GCM secrets vault (C1).
//!
//! Key resolution order is env var, then a 0600 file-backed key, generated
//! once and stable for the process lifetime and across reboots. Decryption
//! never fails outward: an opaque or legacy-plaintext token is returned
//! unchanged rather than raising an error, so a partially-decryptable store
//! can't poison the rest of a pipeline's inputs.

pub mod key;
pub mod store;
pub mod token;

pub use key::{normalize_key_material, resolve_key, SECRETS_KEY_ENV};
pub use store::{mask_sensitive, Vault, VaultStoreError};
pub use token::{decrypt, encrypt, is_encrypted, VaultError, TOKEN_PREFIX};
