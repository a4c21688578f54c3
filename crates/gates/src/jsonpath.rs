// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Dot/bracket JSON-path lookup (`a.b[0].c`) and fenced-JSON extraction from
//! markdown output, used by the `json_field_exists` gate.

use serde_json::Value;

enum Segment {
    Key(String),
    Index(usize),
}

/// Parse `a.b[0].c` / `a[0][1].b` into segments. Leading `.` is tolerated.
fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = path.trim_start_matches('.').chars().peekable();
    let mut current = String::new();

    macro_rules! flush_key {
        () => {
            if !current.is_empty() {
                segments.push(Segment::Key(std::mem::take(&mut current)));
            }
        };
    }

    while let Some(c) = chars.next() {
        match c {
            '.' => flush_key!(),
            '[' => {
                flush_key!();
                let mut index = String::new();
                for c2 in chars.by_ref() {
                    if c2 == ']' {
                        break;
                    }
                    index.push(c2);
                }
                if let Ok(i) = index.trim().parse::<usize>() {
                    segments.push(Segment::Index(i));
                } else if !index.trim().is_empty() {
                    // `["key"]` / `['key']` bracket-quoted key form.
                    segments.push(Segment::Key(
                        index.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string(),
                    ));
                }
            }
            other => current.push(other),
        }
    }
    flush_key!();
    segments
}

/// Look up `path` in `value`. `None` if any segment is missing, or the
/// final value is JSON `null`.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = parse_path(path);
    let mut current = value;
    for segment in &segments {
        current = match segment {
            Segment::Key(key) => current.get(key)?,
            Segment::Index(i) => current.get(i)?,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Extract the first fenced code block that parses as JSON (```` ```json ````
/// or a bare ```` ``` ```` block whose contents parse). Used when a step's
/// `output_format` is markdown but a gate still wants to inspect JSON.
pub fn extract_fenced_json(text: &str) -> Option<Value> {
    let mut rest = text;
    while let Some(start) = rest.find("```") {
        let after_fence = &rest[start + 3..];
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        let end = body.find("```")?;
        let candidate = &body[..end];
        if let Ok(value) = serde_json::from_str::<Value>(candidate.trim()) {
            return Some(value);
        }
        rest = &body[end + 3..];
    }
    None
}

#[cfg(test)]
#[path = "jsonpath_tests.rs"]
mod tests;
