// File: now.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use super::{FunctionError, HeaderFunction};
use crate::args::Arg;
use crate::model::HeaderSet;
use async_trait::async_trait;
use chrono::Utc;

/// Seconds since the Unix epoch. Arguments are ignored.
pub struct Now;

#[async_trait]
impl HeaderFunction for Now {
    fn name(&self) -> &'static str {
        "now"
    }

    async fn resolve(&self, _headers: &HeaderSet, _args: &[Arg]) -> Result<String, FunctionError> {
        Ok(Utc::now().timestamp().to_string())
    }
}
