// File: model.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::args::{parse_call, Arg, ArgError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Request headers keyed by name. Built fresh for every test execution.
pub type HeaderSet = HashMap<String, String>;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(skip)]
    pub filename: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub skip_cert_verification: bool,
    #[serde(default)]
    pub request: RequestSpec,
    #[serde(default)]
    pub response: ResponseExpectation,
}

/// Environment variable name to pattern. Every entry must match for the test to run.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Conditions {
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestSpec {
    #[serde(default)]
    pub scheme: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub headers: HeaderSet,
    #[serde(default)]
    pub dynamic_headers: Vec<DynamicHeaderSpec>,
    #[serde(default)]
    pub body: String,
}

/// A header whose value is computed by a registered function right before
/// the request is sent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawDynamicHeader")]
pub struct DynamicHeaderSpec {
    pub name: String,
    pub function: String,
    pub args: Vec<Arg>,
}

impl DynamicHeaderSpec {
    pub fn new<I, A>(name: &str, function: &str, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        Self {
            name: name.to_string(),
            function: function.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a spec from a call expression such as `concat(x-date, "-", 42)`.
    pub fn from_call(name: &str, call: &str) -> Result<Self, ArgError> {
        let (function, args) = parse_call(call)?;
        Ok(Self {
            name: name.to_string(),
            function,
            args,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawDynamicHeader {
    name: String,
    #[serde(default)]
    function: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    call: Option<String>,
}

impl TryFrom<RawDynamicHeader> for DynamicHeaderSpec {
    type Error = ArgError;

    fn try_from(raw: RawDynamicHeader) -> Result<Self, Self::Error> {
        match (raw.function, raw.call) {
            (Some(function), None) => Ok(Self::new(&raw.name, &function, raw.args)),
            (None, Some(call)) => Self::from_call(&raw.name, &call),
            _ => Err(ArgError::AmbiguousDeclaration(raw.name)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseExpectation {
    /// Empty means any status is accepted.
    #[serde(default)]
    pub status_codes: Vec<u16>,
    #[serde(default)]
    pub headers: HeaderAssertions,
    #[serde(default)]
    pub body: BodyAssertions,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeaderAssertions {
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,
    #[serde(default)]
    pub not_matching: BTreeMap<String, String>,
    #[serde(default)]
    pub not_present: Vec<String>,
    #[serde(default)]
    pub if_present_not_matching: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct BodyAssertions {
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed(Vec<String>),
    Skipped,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Passed => "PASSED",
            Verdict::Failed(_) => "FAILED",
            Verdict::Skipped => "SKIPPED",
        }
    }
}

/// Terminal result of one test execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub filename: String,
    pub description: String,
    pub path: String,
    pub verdict: Verdict,
    pub attempts: u32,
}

impl TestOutcome {
    pub fn new(test: &TestCase, verdict: Verdict, attempts: u32) -> Self {
        Self {
            filename: test.filename.clone(),
            description: test.description.clone(),
            path: test.request.path.clone(),
            verdict,
            attempts,
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }

    pub fn failed(&self) -> bool {
        matches!(self.verdict, Verdict::Failed(_))
    }

    pub fn skipped(&self) -> bool {
        self.verdict == Verdict::Skipped
    }

    pub fn errors(&self) -> &[String] {
        match &self.verdict {
            Verdict::Failed(errors) => errors,
            _ => &[],
        }
    }
}
