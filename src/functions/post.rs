// File: post.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use super::{FunctionError, HeaderFunction};
use crate::args::Arg;
use crate::model::HeaderSet;
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

const POST_TIMEOUT: Duration = Duration::from_secs(10);
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `postData(url, element, part, ...)`
///
/// Posts the parts joined with `&` as a form-encoded body and returns the
/// element found at the dot-separated path of the JSON response.
pub struct PostData;

/// `postFormURLEncoded(url, element, key=value, ...)`
///
/// Like `postData`, but every part is a `key=value` pair encoded by the
/// HTTP client.
pub struct PostFormUrlEncoded;

#[async_trait]
impl HeaderFunction for PostData {
    fn name(&self) -> &'static str {
        "postData"
    }

    async fn resolve(&self, headers: &HeaderSet, args: &[Arg]) -> Result<String, FunctionError> {
        let (url, element, parts) = split_post_args(self.name(), args)?;
        let body = parts
            .iter()
            .map(|part| part.resolve(headers))
            .collect::<Vec<_>>()
            .join("&");

        let client = post_client(url)?;
        let request = client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        let response = send(url, request).await?;
        extract_element(&response, element)
    }
}

#[async_trait]
impl HeaderFunction for PostFormUrlEncoded {
    fn name(&self) -> &'static str {
        "postFormURLEncoded"
    }

    async fn resolve(&self, headers: &HeaderSet, args: &[Arg]) -> Result<String, FunctionError> {
        let (url, element, parts) = split_post_args(self.name(), args)?;
        let form = parts
            .iter()
            .map(|part| {
                let pair = part.resolve(headers);
                pair.split_once('=')
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .ok_or_else(|| FunctionError::MalformedFormPair(pair.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let client = post_client(url)?;
        let response = send(url, client.post(url).form(&form)).await?;
        extract_element(&response, element)
    }
}

fn split_post_args<'a>(
    function: &'static str,
    args: &'a [Arg],
) -> Result<(&'a str, &'a str, &'a [Arg]), FunctionError> {
    let Some((url, rest)) = args.split_first() else {
        return Err(FunctionError::UrlMissing(function));
    };
    if url.raw().is_empty() {
        return Err(FunctionError::UrlEmpty(function));
    }
    let (element, parts) = match rest.split_first() {
        Some((element, parts)) => (element.raw(), parts),
        None => ("", rest),
    };
    Ok((url.raw(), element, parts))
}

fn post_client(url: &str) -> Result<Client, FunctionError> {
    Client::builder()
        .timeout(POST_TIMEOUT)
        .build()
        .map_err(|e| FunctionError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })
}

async fn send(url: &str, request: RequestBuilder) -> Result<String, FunctionError> {
    debug!("Posting dynamic header request to {}", url);
    let http_error = |e: reqwest::Error| FunctionError::Http {
        url: url.to_string(),
        message: e.to_string(),
    };
    let response = request.send().await.map_err(http_error)?;
    response.text().await.map_err(http_error)
}

/// Walks a dot-separated path through a JSON document. Numeric segments
/// index into arrays. Strings and other scalars come back without quotes,
/// objects and arrays as compact JSON. An empty path returns the whole body.
pub fn extract_element(body: &str, path: &str) -> Result<String, FunctionError> {
    let parsed = serde_json::from_str::<Value>(body);
    if path.is_empty() {
        return Ok(match parsed {
            Ok(value) => render(&value),
            Err(_) => body.to_string(),
        });
    }

    let root = parsed.map_err(|e| FunctionError::InvalidJson(e.to_string()))?;
    let mut current = &root;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| FunctionError::ElementNotFound(path.to_string()))?;
    }
    Ok(render(current))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
