//! Thin HTTP transport for request descriptors.
//!
//! The transport is deliberately dumb: it sends exactly one descriptor at a
//! time, reports the status and parsed body back to the caller, and owns
//! the transport-only headers (`X-Bookshop-Async`, `X-IBM-Client-Id`).
//! Error-contract reactions from the API are expected outcomes, so non-2xx
//! statuses are reported, not raised.

use crate::request::{Method, RequestDescriptor};
use anyhow::Context;
use reqwest::StatusCode;

/// Status and parsed body of one API response.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Parsed JSON body, when the response carried one.
    pub body: Option<serde_json::Value>,
}

/// HTTP client for the Bookshop API.
pub struct BookshopClient {
    http: reqwest::Client,
    async_api: bool,
    client_id: Option<String>,
}

impl BookshopClient {
    pub fn new(
        verify_tls: bool,
        async_api: bool,
        client_id: Option<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            async_api,
            client_id,
        })
    }

    /// Send one descriptor and wait for the response.
    pub async fn send(&self, request: &RequestDescriptor) -> anyhow::Result<ApiResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = builder.header("X-Bookshop-Async", self.async_api.to_string());
        if let Some(client_id) = &self.client_id {
            builder = builder.header("X-IBM-Client-Id", client_id);
        }
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("{} {} failed", request.method, request.url))?;
        let status = response.status();
        let body: Option<serde_json::Value> = response.json().await.ok();

        Ok(ApiResponse { status, body })
    }
}
