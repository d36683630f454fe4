// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(dead_code)]

use rconform::config::RunConfig;
use rconform::functions::FunctionRegistry;
use rconform::http::{HttpRequest, ReqwestClient};
use rconform::model::{HeaderSet, RequestSpec, ResponseExpectation, TestCase};
use rconform::runner::TestRunner;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{MockServer, ResponseTemplate};

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn create_mock_response(status: u16, body: &str, headers: HashMap<&str, &str>) -> ResponseTemplate {
    let mut response = ResponseTemplate::new(status).set_body_string(body);
    for (key, value) in headers {
        response = response.insert_header(key, value);
    }
    response
}

pub fn create_json_response(data: serde_json::Value) -> ResponseTemplate {
    let mut headers = HashMap::new();
    headers.insert("content-type", "application/json");
    create_mock_response(200, &data.to_string(), headers)
}

/// `host:port` of a mock server, without the scheme.
pub fn mock_host(server: &MockServer) -> String {
    server.address().to_string()
}

pub fn get_request(server: &MockServer, path: &str) -> HttpRequest {
    get_request_to(&server.uri(), path)
}

pub fn get_request_to(base_url: &str, path: &str) -> HttpRequest {
    HttpRequest {
        method: "GET".to_string(),
        url: format!("{}{}", base_url, path),
        headers: HeaderSet::new(),
        body: String::new(),
        timeout: Duration::from_secs(5),
        skip_tls_verify: false,
    }
}

pub fn http_test(description: &str, method: &str, path: &str, status_codes: Vec<u16>) -> TestCase {
    TestCase {
        filename: "integration.yml".to_string(),
        description: description.to_string(),
        request: RequestSpec {
            scheme: "http".to_string(),
            method: method.to_string(),
            path: path.to_string(),
            ..Default::default()
        },
        response: ResponseExpectation {
            status_codes,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn runner_for(server: &MockServer, max_retries: u32) -> TestRunner {
    let mut config = RunConfig::new();
    config.set_host(mock_host(server));
    config.set_timeout(5);
    config.set_max_retries(max_retries);
    config.set_concurrency(4);

    let client = ReqwestClient::new().expect("HTTP client builds");
    TestRunner::new(Arc::new(client), Arc::new(FunctionRegistry::new()), config)
}
