// File: config.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    Concurrency,
    #[error("timeout must be at least 1 second")]
    Timeout,
    #[error("unknown log level {0}")]
    LogLevel(String),
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    concurrency: usize,
    host: String,
    timeout: u64,
    max_retries: u32,
    print_failed_only: bool,
    test_directory: PathBuf,
    log_level: String,
}

impl RunConfig {
    pub fn new() -> Self {
        Self {
            concurrency: 2,
            host: String::new(),
            timeout: 60,
            max_retries: 0,
            print_failed_only: false,
            test_directory: PathBuf::from("tests"),
            log_level: "warn".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Concurrency);
        }
        if self.timeout == 0 {
            return Err(ConfigError::Timeout);
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::LogLevel(self.log_level.clone()));
        }
        Ok(())
    }

    pub fn set_concurrency(&mut self, concurrency: usize) {
        self.concurrency = concurrency;
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    /// Used when a test does not name its own host. Empty means none.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_timeout(&mut self, timeout: u64) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn set_max_retries(&mut self, max_retries: u32) {
        self.max_retries = max_retries;
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Retries plus the first attempt.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn set_print_failed_only(&mut self, print_failed_only: bool) {
        self.print_failed_only = print_failed_only;
    }

    pub fn print_failed_only(&self) -> bool {
        self.print_failed_only
    }

    pub fn set_test_directory(&mut self, test_directory: impl Into<PathBuf>) {
        self.test_directory = test_directory.into();
    }

    pub fn test_directory(&self) -> &Path {
        &self.test_directory
    }

    pub fn set_log_level(&mut self, log_level: impl Into<String>) {
        self.log_level = log_level.into();
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
