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

//! Transport seam between the typed client and the wire
//!
//! The [`Transport`] trait carries one request/response exchange and
//! nothing else: no auth, no endpoint knowledge, no JSON typing. The
//! production implementation ([`HttpTransport`](crate::HttpTransport))
//! adds transient-failure retry below this interface; tests substitute
//! [`MockTransport`](crate::mock::MockTransport).

use crate::error::ApiResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;

/// HTTP method of an [`ApiRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Uppercase wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outgoing request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Request headers (name, value); names are matched
    /// case-insensitively
    pub headers: Vec<(String, String)>,
    /// Optional JSON body
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request with no headers or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Attach a JSON body
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A single response as seen above the transport
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Response status code
    pub status: u16,
    /// Response headers with lowercased names
    pub headers: Vec<(String, String)>,
    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    /// Create an empty response with the given status
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Create a JSON response with the given status and body
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    /// Attach a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// One request/response exchange against the remote service
///
/// Implementations must retry transient failures internally; callers
/// treat every returned error as fatal.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the final response
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Delete.as_str(), "DELETE");
        assert_eq!(format!("{}", Method::Patch), "PATCH");
    }

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::new(Method::Post, "https://x/git/blobs")
            .with_header("If-None-Match", "\"abc\"")
            .with_body(json!({"content": "aGk="}));

        assert_eq!(req.header("if-none-match"), Some("\"abc\""));
        assert_eq!(req.header("missing"), None);
        assert!(req.body.is_some());
    }

    #[test]
    fn test_response_json() {
        let resp = ApiResponse::json(200, json!({"sha": "abc"}));
        assert!(resp.is_success());
        assert_eq!(resp.header("content-type"), Some("application/json"));

        #[derive(serde::Deserialize)]
        struct Sha {
            sha: String,
        }
        let parsed: Sha = resp.parse().unwrap();
        assert_eq!(parsed.sha, "abc");
    }

    #[test]
    fn test_response_header_case_insensitive() {
        let resp = ApiResponse::empty(304).with_header("ETag", "\"tok\"");
        assert_eq!(resp.header("etag"), Some("\"tok\""));
        assert!(!resp.is_success());
    }
}
