// File: concat.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use super::{FunctionError, HeaderFunction};
use crate::args::Arg;
use crate::model::HeaderSet;
use async_trait::async_trait;

pub struct Concat;

#[async_trait]
impl HeaderFunction for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    async fn resolve(&self, headers: &HeaderSet, args: &[Arg]) -> Result<String, FunctionError> {
        Ok(concat(headers, args))
    }
}

pub fn concat(headers: &HeaderSet, args: &[Arg]) -> String {
    args.iter().map(|arg| arg.resolve(headers)).collect()
}
