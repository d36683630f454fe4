// File: headers.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::functions::{FunctionError, FunctionRegistry};
use crate::model::{DynamicHeaderSpec, HeaderSet};
use log::debug;
use reqwest::header::HeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("cannot process dynamic header {0}; a header with that name is already defined")]
    Collision(String),
    #[error("cannot process dynamic header {name}: {source}")]
    Function {
        name: String,
        #[source]
        source: FunctionError,
    },
    #[error("dynamic header {0} resolved to a value that cannot be sent")]
    InvalidValue(String),
}

/// Evaluates dynamic headers in declaration order and adds them to `headers`.
///
/// Each function sees the static headers plus every dynamic header resolved
/// before it. Nothing is added unless all of them resolve.
pub async fn resolve_dynamic_headers(
    registry: &FunctionRegistry,
    specs: &[DynamicHeaderSpec],
    headers: &mut HeaderSet,
) -> Result<(), HeaderError> {
    if specs.is_empty() {
        return Ok(());
    }

    let mut staged = headers.clone();
    for spec in specs {
        if staged.contains_key(&spec.name) {
            return Err(HeaderError::Collision(spec.name.clone()));
        }

        let value = registry
            .resolve(&spec.function, &staged, &spec.args)
            .await
            .map_err(|source| HeaderError::Function {
                name: spec.name.clone(),
                source,
            })?;
        if HeaderValue::from_str(&value).is_err() {
            return Err(HeaderError::InvalidValue(spec.name.clone()));
        }
        debug!("Resolved dynamic header {} via {}", spec.name, spec.function);
        staged.insert(spec.name.clone(), value);
    }

    *headers = staged;
    Ok(())
}
