// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;

#[test]
fn trims_and_lowercases() {
    assert_eq!(canonicalize_key("  Ticket Id  "), "ticket_id");
}

#[test]
fn punctuation_runs_collapse_to_one_underscore() {
    assert_eq!(canonicalize_key("figma.link!!!url"), "figma_link_url");
}

#[test]
fn known_plural_aliases_to_singular() {
    assert_eq!(canonicalize_key("figma_links"), "figma_link");
    assert_eq!(canonicalize_key("Figma Links"), "figma_link");
}

#[test]
fn unknown_keys_pass_through_unaliased() {
    assert_eq!(canonicalize_key("customer_name"), "customer_name");
}

#[test]
fn leading_and_trailing_punctuation_is_stripped() {
    assert_eq!(canonicalize_key("__weird__"), "weird");
}
