// Octopush - Atomic Multi-File Commits for GitHub
// Copyright (C) 2026 Octopush Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Production [`Transport`] over reqwest
//!
//! Retries transient conditions (connection errors and 5xx responses)
//! with capped exponential backoff; everything above this layer treats
//! a returned response as final.

use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};
use async_trait::async_trait;
use tracing::warn;

/// Configuration for [`HttpTransport`]
#[derive(Clone, Debug)]
pub struct HttpConfig {
    /// Maximum number of attempts per request (default: 3)
    pub max_attempts: u32,
    /// Initial retry delay in milliseconds (default: 100ms)
    pub initial_retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            max_attempts: 3,
            initial_retry_delay_ms: 100,
        }
    }
}

/// reqwest-backed transport with transient-failure retry
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a transport with default retry settings
    pub fn new() -> Self {
        Self::with_config(HttpConfig::default())
    }

    /// Create a transport with custom retry settings
    pub fn with_config(config: HttpConfig) -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn to_reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<ApiResponse, reqwest::Error> {
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut attempt = 0;
        let mut delay_ms = self.config.initial_retry_delay_ms;

        loop {
            attempt += 1;
            let outcome = self.send_once(&request).await;

            match outcome {
                Ok(response) if response.status < 500 || attempt >= self.config.max_attempts => {
                    return Ok(response);
                }
                Ok(response) => {
                    warn!(
                        "{} {} returned {} (attempt {}/{}), retrying in {}ms",
                        request.method,
                        request.url,
                        response.status,
                        attempt,
                        self.config.max_attempts,
                        delay_ms
                    );
                }
                Err(e) if attempt >= self.config.max_attempts => {
                    return Err(ApiError::Network(format!(
                        "{} {} failed after {} attempts: {}",
                        request.method, request.url, attempt, e
                    )));
                }
                Err(e) => {
                    warn!(
                        "{} {} failed (attempt {}/{}), retrying in {}ms: {}",
                        request.method, request.url, attempt, self.config.max_attempts, delay_ms, e
                    );
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
            delay_ms = (delay_ms * 2).min(10_000);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_retry_delay_ms, 100);
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(
            HttpTransport::to_reqwest_method(Method::Patch),
            reqwest::Method::PATCH
        );
        assert_eq!(
            HttpTransport::to_reqwest_method(Method::Delete),
            reqwest::Method::DELETE
        );
    }
}
