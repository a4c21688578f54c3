// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;

fn test_key() -> [u8; 32] {
    [42u8; 32]
}

#[test]
fn round_trips_utf8_plaintext() {
    let key = test_key();
    let token = encrypt(&key, "sk-test-123").unwrap();
    assert!(is_encrypted(&token));
    assert_eq!(decrypt(&key, &token).as_deref(), Some("sk-test-123"));
}

#[test]
fn token_has_three_base64_parts_after_prefix() {
    let key = test_key();
    let token = encrypt(&key, "hello world").unwrap();
    assert!(token.starts_with(TOKEN_PREFIX));
    let rest = &token[TOKEN_PREFIX.len()..];
    assert_eq!(rest.split('.').count(), 3);
}

#[test]
fn wrong_key_fails_to_decrypt() {
    let key = test_key();
    let other_key = [7u8; 32];
    let token = encrypt(&key, "secret value").unwrap();
    assert_eq!(decrypt(&other_key, &token), None);
}

#[test]
fn plaintext_is_not_recognized_as_encrypted() {
    assert!(!is_encrypted("plain-legacy-value"));
    assert!(!is_encrypted("fyv1.only.two"));
}

#[test]
fn each_encryption_uses_a_fresh_iv() {
    let key = test_key();
    let a = encrypt(&key, "same plaintext").unwrap();
    let b = encrypt(&key, "same plaintext").unwrap();
    assert_ne!(a, b);
}
