// File: basic_auth.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use super::{FunctionError, HeaderFunction};
use crate::args::Arg;
use crate::model::HeaderSet;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// `basicAuth(user, password)` -> `Basic base64(user:password)`
pub struct BasicAuth;

#[async_trait]
impl HeaderFunction for BasicAuth {
    fn name(&self) -> &'static str {
        "basicAuth"
    }

    async fn resolve(&self, headers: &HeaderSet, args: &[Arg]) -> Result<String, FunctionError> {
        let [user, password, ..] = args else {
            return Err(FunctionError::MissingArguments {
                function: "basicAuth",
                expected: 2,
                usage: "user and password",
            });
        };

        let credentials = format!("{}:{}", user.resolve(headers), password.resolve(headers));
        Ok(format!("Basic {}", STANDARD.encode(credentials)))
    }
}
