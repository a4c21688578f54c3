// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;

#[test]
fn formats_seconds() {
    assert_eq!(format_elapsed(5), "5s");
    assert_eq!(format_elapsed(59), "59s");
}

#[test]
fn formats_minutes() {
    assert_eq!(format_elapsed(120), "2m");
}

#[test]
fn formats_hours_with_and_without_minutes() {
    assert_eq!(format_elapsed(3600), "1h");
    assert_eq!(format_elapsed(3600 + 5 * 60), "1h5m");
}

#[test]
fn formats_days() {
    assert_eq!(format_elapsed(86400 * 3), "3d");
}

#[test]
fn formats_from_millis() {
    assert_eq!(format_elapsed_ms(90_000), "1m");
}
