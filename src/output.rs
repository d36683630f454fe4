// File: output.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::model::{TestOutcome, Verdict};
use crate::summary::RunSummary;
use colored::*;
use log::warn;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Receives results as tests complete. Calls are serialized by the runner.
pub trait ResultSink: Send {
    fn test_finished(&mut self, outcome: &TestOutcome);
    fn run_finished(&mut self, summary: &RunSummary);
}

pub fn format_outcome(outcome: &TestOutcome) -> String {
    let label = match outcome.verdict {
        Verdict::Passed => outcome.verdict.label().green(),
        Verdict::Failed(_) => outcome.verdict.label().red(),
        Verdict::Skipped => outcome.verdict.label().blue(),
    };

    let mut line = format!(
        "{} {} | {} | [{}]",
        label, outcome.filename, outcome.description, outcome.path
    );
    if outcome.attempts > 1 {
        line.push_str(&format!(" ({} attempts)", outcome.attempts));
    }
    if !outcome.errors().is_empty() {
        line.push_str("\n  errors:");
        for error in outcome.errors() {
            line.push_str("\n    ");
            line.push_str(error);
        }
    }
    line
}

pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "{} passed / {} failed / {} skipped ({:.2}s)",
        summary.passed().to_string().green(),
        summary.failed().to_string().red(),
        summary.skipped().to_string().blue(),
        summary.elapsed().as_secs_f64()
    )
}

/// Writes one line per test, plus an error block for failures, to a writer
/// (stdout by default).
pub struct ConsoleSink<W: Write + Send = io::Stdout> {
    writer: W,
    print_failed_only: bool,
}

impl ConsoleSink {
    pub fn new(print_failed_only: bool) -> Self {
        ConsoleSink::with_writer(io::stdout(), print_failed_only)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn with_writer(writer: W, print_failed_only: bool) -> Self {
        ConsoleSink {
            writer,
            print_failed_only,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ResultSink for ConsoleSink<W> {
    fn test_finished(&mut self, outcome: &TestOutcome) {
        if self.print_failed_only && outcome.passed() {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{}", format_outcome(outcome)) {
            warn!("Failed to write result for {}: {}", outcome.filename, e);
        }
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        let written = writeln!(self.writer, "\n{}", format_summary(summary))
            .and_then(|()| self.writer.flush());
        if let Err(e) = written {
            warn!("Failed to write run summary: {}", e);
        }
    }
}

/// Collects outcomes in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct OutcomeLog {
    outcomes: Arc<Mutex<Vec<TestOutcome>>>,
    summary: Arc<Mutex<Option<RunSummary>>>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<TestOutcome> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn summary(&self) -> Option<RunSummary> {
        *self.summary.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultSink for OutcomeLog {
    fn test_finished(&mut self, outcome: &TestOutcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome.clone());
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        *self.summary.lock().unwrap_or_else(PoisonError::into_inner) = Some(*summary);
    }
}
