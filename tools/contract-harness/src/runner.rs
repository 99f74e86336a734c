//! Sends one fixture request and compares the response against its expectation.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::fixture::{Expect, Fixture};

/// Outcome of a single fixture.
pub struct RunResult {
    pub expected_status: u16,
    pub actual_status: Option<u16>,
    pub header_mismatches: Vec<String>,
    pub body_mismatch: Option<String>,
    /// `x-request-id` echoed by the service, handy for grepping its logs.
    pub request_id: Option<String>,
    pub elapsed: Duration,
    /// Transport failure (connection refused, timeout, bad method).
    pub error: Option<String>,
}

impl RunResult {
    fn failed_before_send(expected_status: u16, error: String) -> Self {
        Self {
            expected_status,
            actual_status: None,
            header_mismatches: Vec::new(),
            body_mismatch: None,
            request_id: None,
            elapsed: Duration::ZERO,
            error: Some(error),
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none()
            && self.actual_status == Some(self.expected_status)
            && self.header_mismatches.is_empty()
            && self.body_mismatch.is_none()
    }
}

pub struct Runner {
    client: Client,
    base_url: String,
}

impl Runner {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub async fn run(&self, fixture: &Fixture) -> RunResult {
        let expected_status = fixture.expect.status;
        let url = format!("{}{}", self.base_url, fixture.request.path);

        let Ok(method) = Method::from_bytes(fixture.request.method.to_uppercase().as_bytes())
        else {
            return RunResult::failed_before_send(
                expected_status,
                format!("unknown HTTP method: {}", fixture.request.method),
            );
        };

        let mut req = self.client.request(method, &url);
        for (k, v) in &fixture.request.headers {
            req = req.header(k, v);
        }
        req = match &fixture.request.body {
            // Raw text lets fixtures carry payloads that are not valid JSON.
            Some(Value::String(raw)) => req.header(CONTENT_TYPE, "application/json").body(raw.clone()),
            Some(body) => req.json(body),
            None => req,
        };

        let started = Instant::now();
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => return RunResult::failed_before_send(expected_status, e.to_string()),
        };

        let actual_status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body_text = resp.text().await.unwrap_or_default();
        let elapsed = started.elapsed();

        RunResult {
            expected_status,
            actual_status: Some(actual_status),
            header_mismatches: header_mismatches(&fixture.expect, &headers),
            body_mismatch: body_mismatch(&fixture.expect, &body_text),
            request_id: headers
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            elapsed,
            error: None,
        }
    }
}

/// Subset match: every expected header must be present with the exact value.
fn header_mismatches(expect: &Expect, headers: &HeaderMap) -> Vec<String> {
    let mut mismatches = Vec::new();
    for (name, expected) in &expect.headers {
        match headers.get(name.as_str()) {
            Some(actual) if actual.to_str().unwrap_or("") == expected => {}
            Some(actual) => mismatches.push(format!(
                "{name}: expected {expected:?}, got {:?}",
                actual.to_str().unwrap_or("<non-utf8>")
            )),
            None => mismatches.push(format!("{name}: missing (expected {expected:?})")),
        }
    }
    mismatches.sort();
    mismatches
}

fn body_mismatch(expect: &Expect, body_text: &str) -> Option<String> {
    let expected = expect.body.as_ref()?;
    let actual: Value = serde_json::from_str(body_text).unwrap_or(Value::Null);
    (&actual != expected).then(|| format!("body: expected {expected}, got {actual}"))
}
