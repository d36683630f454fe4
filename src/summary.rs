// File: summary.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2022-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::model::{TestOutcome, Verdict};
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    total_tests: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(total_tests: usize) -> RunSummary {
        RunSummary {
            total_tests,
            passed: 0,
            failed: 0,
            skipped: 0,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    pub fn record(&mut self, outcome: &TestOutcome) {
        match outcome.verdict {
            Verdict::Passed => self.add_passed(),
            Verdict::Failed(_) => self.add_failed(),
            Verdict::Skipped => self.add_skipped(),
        }
    }

    pub fn add_passed(&mut self) {
        self.passed += 1;
    }

    pub fn add_failed(&mut self) {
        self.failed += 1;
    }

    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
    }

    pub fn total_tests(&self) -> usize {
        self.total_tests
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn completed(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Skipped tests never count against success.
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.success() {
            0
        } else {
            1
        }
    }

    pub fn elapsed(&self) -> Duration {
        let end = self.end_time.unwrap_or_else(Utc::now);
        (end - self.start_time).to_std().unwrap_or_default()
    }
}
