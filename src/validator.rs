// File: validator.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::httpinner::HttpResponse;
use crate::model::{BodyAssertions, HeaderAssertions, ResponseExpectation};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Status,
    Header,
    Body,
    /// The assertion itself could not be compiled.
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, message: String) -> Self {
        Violation { kind, message }
    }

    fn invalid_pattern(pattern: &str, error: regex::Error) -> Self {
        Violation::new(
            ViolationKind::Pattern,
            format!("invalid test pattern `{}`: {}", pattern, error),
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Compiles a test author's pattern with the case-insensitive flag set.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn compile_bytes_pattern(pattern: &str) -> Result<regex::bytes::Regex, regex::Error> {
    regex::bytes::RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
}

/// Checks a response against every assertion and returns all violations,
/// status first, then headers, then body.
pub fn validate_response(expected: &ResponseExpectation, response: &HttpResponse) -> Vec<Violation> {
    let mut violations = Vec::new();
    validate_status(&expected.status_codes, response.status(), &mut violations);
    validate_headers(&expected.headers, response, &mut violations);
    validate_body(&expected.body, response.body(), &mut violations);
    violations
}

pub fn validate_status(accepted: &[u16], actual: u16, violations: &mut Vec<Violation>) {
    if !accepted.is_empty() && !accepted.contains(&actual) {
        violations.push(Violation::new(
            ViolationKind::Status,
            format!(
                "unexpected status code - expected {:?}, got {}",
                accepted, actual
            ),
        ));
    }
}

pub fn validate_headers(
    assertions: &HeaderAssertions,
    response: &HttpResponse,
    violations: &mut Vec<Violation>,
) {
    for (name, pattern) in &assertions.patterns {
        let regex = match compile_pattern(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                violations.push(Violation::invalid_pattern(pattern, e));
                continue;
            }
        };
        let values = present_values(response, name);
        if values.is_empty() {
            violations.push(Violation::new(
                ViolationKind::Header,
                format!(
                    "response header \"{}\" not found, expected to match pattern \"{}\"",
                    name, pattern
                ),
            ));
        } else if !values.iter().any(|value| regex.is_match(value)) {
            violations.push(Violation::new(
                ViolationKind::Header,
                format!(
                    "response header \"{}\" has value \"{}\", which does not match pattern \"{}\"",
                    name,
                    values.join(", "),
                    pattern
                ),
            ));
        }
    }

    for (name, pattern) in &assertions.not_matching {
        check_not_matching(name, pattern, response, true, violations);
    }

    for name in &assertions.not_present {
        if !present_values(response, name).is_empty() {
            violations.push(Violation::new(
                ViolationKind::Header,
                format!("found unexpected response header \"{}\"", name),
            ));
        }
    }

    for (name, pattern) in &assertions.if_present_not_matching {
        check_not_matching(name, pattern, response, false, violations);
    }
}

fn check_not_matching(
    name: &str,
    pattern: &str,
    response: &HttpResponse,
    required: bool,
    violations: &mut Vec<Violation>,
) {
    let regex = match compile_pattern(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            violations.push(Violation::invalid_pattern(pattern, e));
            return;
        }
    };
    let values = present_values(response, name);
    if values.is_empty() {
        if required {
            violations.push(Violation::new(
                ViolationKind::Header,
                format!(
                    "response header \"{}\" not found, expected to be present",
                    name
                ),
            ));
        }
        return;
    }
    if let Some(value) = values.iter().find(|value| regex.is_match(value)) {
        violations.push(Violation::new(
            ViolationKind::Header,
            format!(
                "response header \"{}\" has value \"{}\", which matches pattern \"{}\"",
                name, value, pattern
            ),
        ));
    }
}

/// Non-empty values of a header; a header sent with an empty value counts as absent.
fn present_values<'a>(response: &'a HttpResponse, name: &str) -> Vec<Cow<'a, str>> {
    response
        .header_values(name)
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect()
}

pub fn validate_body(assertions: &BodyAssertions, body: &[u8], violations: &mut Vec<Violation>) {
    for pattern in &assertions.patterns {
        match compile_bytes_pattern(pattern) {
            Ok(regex) if regex.is_match(body) => {}
            Ok(_) => violations.push(Violation::new(
                ViolationKind::Body,
                format!("response body does not match pattern \"{}\"", pattern),
            )),
            Err(e) => violations.push(Violation::invalid_pattern(pattern, e)),
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
