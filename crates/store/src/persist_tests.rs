// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;
use serde::Deserialize;
use std::io::Write;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Sample {
    a: u32,
    b: String,
}

#[test]
fn load_missing_file_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    let loaded: Option<Sample> = load_atomic(&path).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    let value = Sample {
        a: 1,
        b: "hi".to_string(),
    };
    save_atomic(&path, &value).unwrap();
    let loaded: Option<Sample> = load_atomic(&path).unwrap();
    assert_eq!(loaded, Some(value));
}

#[test]
fn save_leaves_no_tmp_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    save_atomic(&path, &Sample { a: 1, b: "x".into() }).unwrap();
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn corrupt_file_is_rotated_to_bak_and_treated_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(b"not json").unwrap();

    let loaded: Option<Sample> = load_atomic(&path).unwrap();
    assert!(loaded.is_none());
    assert!(path.with_extension("bak").exists());
}
