// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::{ConfigError, RunConfig};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[arg(
        short = 'd',
        long = "dir",
        env = "TEST_DIRECTORY",
        default_value = "tests",
        help = "Directory containing the test definition files"
    )]
    pub test_directory: PathBuf,

    #[arg(
        short = 'H',
        long = "host",
        env = "TEST_HOST",
        default_value = "",
        help = "Host used by tests that do not name one"
    )]
    pub host: String,

    #[arg(
        short = 'c',
        long = "concurrency",
        env = "TEST_CONCURRENCY",
        default_value_t = 2,
        help = "Number of tests executed at the same time"
    )]
    pub concurrency: usize,

    #[arg(
        short = 't',
        long = "timeout",
        env = "TEST_TIMEOUT",
        default_value_t = 60,
        help = "HTTP request timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        short = 'r',
        long = "max-retries",
        env = "TEST_MAX_RETRIES",
        default_value_t = 0,
        help = "Retries after a failed attempt"
    )]
    pub max_retries: u32,

    #[arg(
        short = 'f',
        long = "print-failed-only",
        env = "TEST_PRINT_FAILED_ONLY",
        help = "Only print failed and skipped tests"
    )]
    pub print_failed_only: bool,

    #[arg(long = "log-level", env = "TEST_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long = "no-color", help = "Disable colored output")]
    pub no_color: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<RunConfig, ConfigError> {
        let mut config = RunConfig::new();
        config.set_test_directory(self.test_directory);
        config.set_host(self.host);
        config.set_concurrency(self.concurrency);
        config.set_timeout(self.timeout);
        config.set_max_retries(self.max_retries);
        config.set_print_failed_only(self.print_failed_only);
        config.set_log_level(if self.verbose {
            "debug".to_string()
        } else {
            self.log_level
        });
        config.validate()?;
        Ok(config)
    }
}

pub fn log_level_filter(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Warn)
}
