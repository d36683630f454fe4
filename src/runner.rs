// File: runner.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::RunConfig;
use crate::functions::FunctionRegistry;
use crate::headers::{resolve_dynamic_headers, HeaderError};
use crate::http::{HttpClient, HttpRequest};
use crate::model::{Conditions, DynamicHeaderSpec, HeaderSet, TestCase, TestOutcome, Verdict};
use crate::output::ResultSink;
use crate::summary::RunSummary;
use crate::validator::{compile_pattern, validate_response, Violation, ViolationKind};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, error, warn};
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::Semaphore;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_METHOD: &str = "GET";
pub const ALLOWED_METHODS: [&str; 9] = [
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "PURGE", "PROPFIND",
];

/// Decides whether a failed attempt is tried again. The first argument is
/// true when the attempt produced no response at all: a transport failure, a
/// dynamic header function error or a dynamic value that cannot be sent.
pub type RetryPredicate = Arc<dyn Fn(bool, &[Violation]) -> bool + Send + Sync>;

pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Retries every unsuccessful attempt.
pub fn retry_on_failure() -> RetryPredicate {
    Arc::new(|attempt_error: bool, violations: &[Violation]| attempt_error || !violations.is_empty())
}

/// Retries attempts without a response or with an unexpected status code.
pub fn retry_on_status() -> RetryPredicate {
    Arc::new(|attempt_error: bool, violations: &[Violation]| {
        attempt_error || violations.iter().any(|v| v.kind == ViolationKind::Status)
    })
}

pub fn never_retry() -> RetryPredicate {
    Arc::new(|_: bool, _: &[Violation]| false)
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("invalid scheme {0}. only http and https are supported")]
    InvalidScheme(String),
    #[error("no host specified for this test and no default host set")]
    MissingHost,
    #[error("invalid method {0}. allowed methods are {allowed}", allowed = ALLOWED_METHODS.join(", "))]
    InvalidMethod(String),
    #[error("request path is required")]
    MissingPath,
    #[error("request.path must start with /, got {0}")]
    RelativePath(String),
    #[error("header {0} is defined more than once")]
    DuplicateHeader(String),
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),
    #[error("invalid value for header {0}")]
    InvalidHeaderValue(String),
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("invalid condition pattern `{pattern}` for {variable}: {message}")]
    InvalidCondition {
        variable: String,
        pattern: String,
        message: String,
    },
}

/// A test with defaults filled in and its request target validated.
#[derive(Debug, Clone)]
pub struct PreparedTest {
    pub method: String,
    pub url: String,
    pub headers: HeaderSet,
    pub dynamic_headers: Vec<DynamicHeaderSpec>,
    pub body: String,
    pub skip_tls_verify: bool,
}

/// True when every variable matches its pattern. Unset variables are
/// matched as the empty string.
pub fn conditions_met<F>(conditions: &Conditions, lookup: F) -> Result<bool, DefinitionError>
where
    F: Fn(&str) -> Option<String>,
{
    for (variable, pattern) in &conditions.env {
        let regex = compile_pattern(pattern).map_err(|e| DefinitionError::InvalidCondition {
            variable: variable.clone(),
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        let value = lookup(variable).unwrap_or_default();
        if !regex.is_match(&value) {
            debug!("Condition on {} not met", variable);
            return Ok(false);
        }
    }
    Ok(true)
}

/// Lowercases every header name. Two names that only differ in case are
/// rejected.
pub fn normalize_header_names(headers: HeaderSet) -> Result<HeaderSet, DefinitionError> {
    let mut normalized = HeaderSet::with_capacity(headers.len());
    for (name, value) in headers {
        let lower = name.to_lowercase();
        if normalized.insert(lower.clone(), value).is_some() {
            return Err(DefinitionError::DuplicateHeader(lower));
        }
    }
    Ok(normalized)
}

/// Fills scheme, host and method defaults and validates the request target.
/// Dynamic header names are checked against the static ones here so that a
/// collision fails the test before any attempt is made.
pub fn prepare(test: &TestCase, default_host: &str) -> Result<PreparedTest, DefinitionError> {
    let request = &test.request;

    let scheme = if request.scheme.is_empty() {
        DEFAULT_SCHEME.to_string()
    } else {
        request.scheme.to_lowercase()
    };
    if scheme != "http" && scheme != "https" {
        return Err(DefinitionError::InvalidScheme(request.scheme.clone()));
    }

    let host = if request.host.is_empty() {
        default_host
    } else {
        request.host.as_str()
    };
    if host.is_empty() {
        return Err(DefinitionError::MissingHost);
    }

    let method = if request.method.is_empty() {
        DEFAULT_METHOD.to_string()
    } else {
        request.method.to_uppercase()
    };
    if !ALLOWED_METHODS.contains(&method.as_str()) {
        return Err(DefinitionError::InvalidMethod(request.method.clone()));
    }

    if request.path.is_empty() {
        return Err(DefinitionError::MissingPath);
    }
    if !request.path.starts_with('/') {
        return Err(DefinitionError::RelativePath(request.path.clone()));
    }

    let mut seen: HashSet<String> = HashSet::new();
    for (name, value) in &request.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(DefinitionError::InvalidHeaderName(name.clone()));
        }
        if HeaderValue::from_str(value).is_err() {
            return Err(DefinitionError::InvalidHeaderValue(name.clone()));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(DefinitionError::DuplicateHeader(name.to_lowercase()));
        }
    }
    for spec in &request.dynamic_headers {
        if HeaderName::from_bytes(spec.name.as_bytes()).is_err() {
            return Err(DefinitionError::InvalidHeaderName(spec.name.clone()));
        }
        if request.headers.contains_key(&spec.name) {
            return Err(HeaderError::Collision(spec.name.clone()).into());
        }
        if !seen.insert(spec.name.to_lowercase()) {
            return Err(DefinitionError::DuplicateHeader(spec.name.to_lowercase()));
        }
    }

    Ok(PreparedTest {
        method,
        url: format!("{}://{}{}", scheme, host, request.path),
        headers: request.headers.clone(),
        dynamic_headers: request.dynamic_headers.clone(),
        body: request.body.clone(),
        skip_tls_verify: test.skip_cert_verification,
    })
}

enum AttemptResult {
    /// No response was obtained.
    Error(String),
    Response(Vec<Violation>),
}

#[derive(Clone)]
pub struct TestRunner {
    client: Arc<dyn HttpClient>,
    registry: Arc<FunctionRegistry>,
    retry: RetryPredicate,
    env: EnvLookup,
    config: RunConfig,
}

impl TestRunner {
    pub fn new(client: Arc<dyn HttpClient>, registry: Arc<FunctionRegistry>, config: RunConfig) -> Self {
        TestRunner {
            client,
            registry,
            retry: retry_on_failure(),
            env: Arc::new(|name: &str| std::env::var(name).ok()),
            config,
        }
    }

    pub fn with_retry_predicate(mut self, retry: RetryPredicate) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the environment used for skip conditions.
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs one test to completion, including every retry.
    pub async fn run_test(&self, test: &TestCase) -> TestOutcome {
        let prepared = match prepare(test, self.config.host()) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!("{}: {}", test.filename, e);
                return TestOutcome::new(test, Verdict::Failed(vec![e.to_string()]), 0);
            }
        };

        match conditions_met(&test.conditions, |name| (self.env)(name)) {
            Ok(true) => {}
            Ok(false) => return TestOutcome::new(test, Verdict::Skipped, 0),
            Err(e) => {
                warn!("{}: {}", test.filename, e);
                return TestOutcome::new(test, Verdict::Failed(vec![e.to_string()]), 0);
            }
        }

        let max_attempts = self.config.max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match self.attempt(test, &prepared).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("{}: {}", test.filename, e);
                    return TestOutcome::new(test, Verdict::Failed(vec![e.to_string()]), attempt - 1);
                }
            };

            let (attempt_error, violations, errors) = match result {
                AttemptResult::Response(violations) if violations.is_empty() => {
                    return TestOutcome::new(test, Verdict::Passed, attempt);
                }
                AttemptResult::Response(violations) => {
                    let errors = violations.iter().map(ToString::to_string).collect();
                    (false, violations, errors)
                }
                AttemptResult::Error(message) => (true, Vec::new(), vec![message]),
            };

            if attempt < max_attempts && (self.retry)(attempt_error, &violations) {
                debug!(
                    "{} attempt {}/{} failed, retrying",
                    test.filename, attempt, max_attempts
                );
                continue;
            }
            return TestOutcome::new(test, Verdict::Failed(errors), attempt);
        }
    }

    async fn attempt(
        &self,
        test: &TestCase,
        prepared: &PreparedTest,
    ) -> Result<AttemptResult, DefinitionError> {
        let mut headers = prepared.headers.clone();
        match resolve_dynamic_headers(&self.registry, &prepared.dynamic_headers, &mut headers).await {
            Ok(()) => {}
            Err(error @ (HeaderError::Function { .. } | HeaderError::InvalidValue(_))) => {
                warn!("{}: {}", test.filename, error);
                return Ok(AttemptResult::Error(error.to_string()));
            }
            Err(collision) => return Err(collision.into()),
        }

        let request = HttpRequest {
            method: prepared.method.clone(),
            url: prepared.url.clone(),
            headers: normalize_header_names(headers)?,
            body: prepared.body.clone(),
            timeout: self.config.request_timeout(),
            skip_tls_verify: prepared.skip_tls_verify,
        };

        match self.client.send(&request).await {
            Ok(response) => Ok(AttemptResult::Response(validate_response(
                &test.response,
                &response,
            ))),
            Err(e) => {
                warn!("{}: {}", test.filename, e);
                Ok(AttemptResult::Error(e.to_string()))
            }
        }
    }

    /// Runs every test on a pool of `concurrency` workers. Each finished
    /// outcome is counted and handed to the sink under one lock; the final
    /// summary is returned once all workers are done.
    pub async fn run_all<S>(&self, tests: Vec<TestCase>, sink: S) -> RunSummary
    where
        S: ResultSink + 'static,
    {
        let shared = Arc::new(Mutex::new((RunSummary::new(tests.len()), sink)));
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency().max(1)));
        let mut tasks = FuturesUnordered::new();

        for test in tests {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Worker pool closed: {}", e);
                    break;
                }
            };
            let identity = TestOutcome::new(&test, Verdict::Skipped, 0);
            let runner = self.clone();
            let shared_task = Arc::clone(&shared);

            let handle = tokio::spawn(async move {
                let outcome = runner.run_test(&test).await;
                drop(permit);
                record(&shared_task, &outcome);
            });
            let shared_join = Arc::clone(&shared);
            tasks.push(async move {
                // Only a panic inside run_test lands here; record never unwinds.
                if let Err(e) = handle.await {
                    error!("Test {} did not complete: {}", identity.filename, e);
                    let outcome = TestOutcome {
                        verdict: Verdict::Failed(vec![format!("test execution aborted: {}", e)]),
                        ..identity
                    };
                    record(&shared_join, &outcome);
                }
            });
        }

        while tasks.next().await.is_some() {}

        let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
        let (summary, sink) = &mut *guard;
        summary.finish();
        sink.run_finished(summary);
        *summary
    }
}

fn record<S: ResultSink>(shared: &Mutex<(RunSummary, S)>, outcome: &TestOutcome) {
    let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
    let (summary, sink) = &mut *guard;
    summary.record(outcome);
    if panic::catch_unwind(AssertUnwindSafe(|| sink.test_finished(outcome))).is_err() {
        error!("Result sink panicked while reporting {}", outcome.filename);
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
