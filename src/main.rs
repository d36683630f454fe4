// File: main.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2022-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use rconform::cli::{log_level_filter, Cli};
use rconform::definitions::{DirectorySource, TestSource};
use rconform::functions::FunctionRegistry;
use rconform::http::ReqwestClient;
use rconform::output::ConsoleSink;
use rconform::runner::TestRunner;
use simple_logger::SimpleLogger;
use std::process::ExitCode;
use std::sync::Arc;

fn init_logger(level: &str) -> Result<()> {
    SimpleLogger::new()
        .with_level(log_level_filter(level))
        .init()
        .context("failed to initialise logger")
}

async fn run(cli: Cli) -> Result<bool> {
    let no_color = cli.no_color;
    let config = cli.into_config().context("invalid configuration")?;
    init_logger(config.log_level())?;
    if no_color {
        colored::control::set_override(false);
    }

    println!(
        "{} {} by {} under {} license.",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
        env!("CARGO_PKG_LICENSE")
    );

    let source = DirectorySource::new(config.test_directory());
    let tests = source
        .load()
        .with_context(|| format!("failed to load tests from {}", source.root().display()))?;
    info!(
        "Running {} tests with concurrency {}",
        tests.len(),
        config.concurrency()
    );

    let client = ReqwestClient::new().context("failed to create HTTP client")?;
    let sink = ConsoleSink::new(config.print_failed_only());
    let runner = TestRunner::new(Arc::new(client), Arc::new(FunctionRegistry::new()), config);

    let summary = runner.run_all(tests, sink).await;
    Ok(summary.success())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
