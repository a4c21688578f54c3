// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;

#[test]
fn checks_shared_before_isolated_before_run() {
    let dir = tempfile::tempdir().unwrap();
    let run = dir.path().join("run");
    let isolated = dir.path().join("isolated");
    let shared = dir.path().join("shared");
    std::fs::create_dir_all(&run).unwrap();
    std::fs::create_dir_all(&isolated).unwrap();
    std::fs::create_dir_all(&shared).unwrap();
    std::fs::write(isolated.join("out.txt"), "hi").unwrap();

    let paths = StoragePaths {
        shared: Some(shared),
        isolated: Some(isolated),
        run,
    };
    assert!(paths.exists("out.txt"));
    assert!(!paths.exists("missing.txt"));
}

#[test]
fn falls_back_to_run_when_no_shared_or_isolated() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.json"), "{}").unwrap();
    let paths = StoragePaths {
        shared: None,
        isolated: None,
        run: dir.path().to_path_buf(),
    };
    assert!(paths.exists("a.json"));
}
