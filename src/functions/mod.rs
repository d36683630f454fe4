// File: mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

pub mod basic_auth;
pub mod concat;
pub mod now;
pub mod post;
pub mod sign;

use crate::args::Arg;
use crate::model::HeaderSet;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("unknown function {0}")]
    UnknownFunction(String),
    #[error("error calling {function}; at least {expected} arguments are needed ({usage})")]
    MissingArguments {
        function: &'static str,
        expected: usize,
        usage: &'static str,
    },
    #[error("error calling signStringRS256PKCS8; key is empty")]
    EmptyKey,
    #[error("error calling signStringRS256PKCS8; key in invalid format, expected {0} delimiters")]
    KeyFormat(&'static str),
    #[error("error calling signStringRS256PKCS8; unable to parse private key: {0}")]
    KeyParse(String),
    #[error("error calling signStringRS256PKCS8; key is not an RSA key")]
    KeyType,
    #[error("error calling signStringRS256PKCS8; could not sign header: {0}")]
    Sign(String),
    #[error("error calling {0}; URL is required")]
    UrlMissing(&'static str),
    #[error("error calling {0}; URL is empty")]
    UrlEmpty(&'static str),
    #[error("error: element {0} not found in response body")]
    ElementNotFound(String),
    #[error("form value \"{0}\" is not a key=value pair")]
    MalformedFormPair(String),
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
}

/// Computes one dynamic header value from the headers resolved so far.
#[async_trait]
pub trait HeaderFunction: Send + Sync {
    fn name(&self) -> &'static str;
    async fn resolve(&self, headers: &HeaderSet, args: &[Arg]) -> Result<String, FunctionError>;
}

pub struct FunctionRegistry {
    functions: HashMap<&'static str, Box<dyn HeaderFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_known_functions();
        registry
    }

    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Adds a function, replacing any previous one with the same name.
    pub fn register(&mut self, function: Box<dyn HeaderFunction>) {
        self.functions.insert(function.name(), function);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub async fn resolve(
        &self,
        name: &str,
        headers: &HeaderSet,
        args: &[Arg],
    ) -> Result<String, FunctionError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?;
        debug!("Resolving dynamic header function {} with {} args", name, args.len());
        function.resolve(headers, args).await
    }

    pub fn register_known_functions(&mut self) {
        self.register(Box::new(now::Now));
        self.register(Box::new(concat::Concat));
        self.register(Box::new(basic_auth::BasicAuth));
        self.register(Box::new(sign::SignStringRs256Pkcs8));
        self.register(Box::new(post::PostData));
        self.register(Box::new(post::PostFormUrlEncoded));
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
