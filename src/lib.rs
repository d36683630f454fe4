// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_inception)]
#![allow(clippy::bool_assert_comparison)]

pub mod args;
pub mod cli;
pub mod config;
pub mod definitions;
pub mod functions;
pub mod headers;
pub mod http;
pub mod httpinner;
pub mod model;
pub mod output;
pub mod runner;
pub mod summary;
pub mod validator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_imports() {
        let _ = config::RunConfig::default();
        let _ = functions::FunctionRegistry::new();
        let _ = httpinner::HttpResponse::new(200);
        let _ = summary::RunSummary::new(0);
        let _ = output::OutcomeLog::new();
        let _ = definitions::DirectorySource::new("tests");
    }
}
