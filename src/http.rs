// File: http.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023
// - Volker Schwaberow <volker@schwaberow.de>

use crate::httpinner::HttpResponse;
use crate::model::HeaderSet;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Client, Method};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("error executing request {url}: {message}")]
    Request { url: String, message: String },
    #[error("error reading response body from {url}: {message}")]
    Body { url: String, message: String },
}

/// Everything needed to send one attempt.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: HeaderSet,
    pub body: String,
    pub timeout: Duration,
    pub skip_tls_verify: bool,
}

/// Sends a request and reads the whole response. Redirects are returned
/// as-is and never followed.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `HttpClient` backed by two reqwest clients, one verifying certificates
/// and one that does not.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    verified: Client,
    insecure: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, TransportError> {
        Ok(ReqwestClient {
            verified: build_client(false)?,
            insecure: build_client(true)?,
        })
    }

    fn client(&self, skip_tls_verify: bool) -> &Client {
        if skip_tls_verify {
            &self.insecure
        } else {
            &self.verified
        }
    }
}

fn build_client(skip_tls_verify: bool) -> Result<Client, TransportError> {
    Client::builder()
        .redirect(redirect::Policy::none())
        .danger_accept_invalid_certs(skip_tls_verify)
        .build()
        .map_err(|e| TransportError::Client(e.to_string()))
}

fn header_map(headers: &HeaderSet) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid header name {}", name)))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            TransportError::InvalidRequest(format!("invalid value for header {}", name))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid method {}", request.method)))?;
        let headers = header_map(&request.headers)?;

        let mut names: Vec<&str> = request.headers.keys().map(String::as_str).collect();
        names.sort_unstable();
        info!("{} {} headers: {:?}", request.method, request.url, names);

        let mut builder = self
            .client(request.skip_tls_verify)
            .request(method, &request.url)
            .headers(headers)
            .timeout(request.timeout);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: request.url.clone(),
                }
            } else {
                TransportError::Request {
                    url: request.url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| TransportError::Body {
            url: url.clone(),
            message: e.to_string(),
        })?;
        debug!("{} responded {} with {} body bytes", url, status, body.len());

        Ok(HttpResponse::new_with_all(status, headers, body.to_vec(), url))
    }
}
