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

//! Scripted in-memory transport for testing
//!
//! Routes are keyed by method plus a URL substring. Each route holds a
//! queue of responses: a queue with more than one entry pops from the
//! front, and the last entry is sticky, so a finite script can serve an
//! unbounded poll loop. Unscripted requests fail loudly.
//!
//! # Examples
//!
//! ```rust
//! use octopush_api::mock::MockTransport;
//! use octopush_api::{ApiRequest, ApiResponse, Method, Transport};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), octopush_api::ApiError> {
//! let mock = MockTransport::new();
//! mock.enqueue(Method::Get, "/git/blobs/d1", ApiResponse::empty(404))
//!     .await;
//!
//! let resp = mock
//!     .send(ApiRequest::new(Method::Get, "https://api/repos/o/r/git/blobs/d1"))
//!     .await?;
//! assert_eq!(resp.status, 404);
//! assert_eq!(mock.requests().await.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Route {
    method: Method,
    pattern: String,
    responses: VecDeque<ApiResponse>,
}

/// Scripted transport for tests
///
/// Thread-safe; clones share routes and the request log, so a test can
/// hand one clone to the client and keep another for assertions.
#[derive(Clone)]
pub struct MockTransport {
    routes: Arc<RwLock<Vec<Route>>>,
    requests: Arc<RwLock<Vec<ApiRequest>>>,
}

impl MockTransport {
    /// Create a transport with no scripted routes
    pub fn new() -> Self {
        MockTransport {
            routes: Arc::new(RwLock::new(Vec::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Script a response for requests whose URL contains `pattern`
    ///
    /// Repeated calls for the same method/pattern queue responses in
    /// order; the final one repeats indefinitely.
    pub async fn enqueue(&self, method: Method, pattern: &str, response: ApiResponse) {
        let mut routes = self.routes.write().await;
        if let Some(route) = routes
            .iter_mut()
            .find(|r| r.method == method && r.pattern == pattern)
        {
            route.responses.push_back(response);
        } else {
            routes.push(Route {
                method,
                pattern: pattern.to_string(),
                responses: VecDeque::from([response]),
            });
        }
    }

    /// Every request seen so far, in arrival order
    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.requests.read().await.clone()
    }

    /// Number of recorded requests matching a method and URL substring
    pub async fn request_count(&self, method: Method, pattern: &str) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.method == method && r.url.contains(pattern))
            .count()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport").finish()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        self.requests.write().await.push(request.clone());

        let mut routes = self.routes.write().await;
        let route = routes
            .iter_mut()
            .find(|r| r.method == request.method && request.url.contains(&r.pattern));

        match route {
            Some(route) => {
                let response = if route.responses.len() > 1 {
                    route.responses.pop_front()
                } else {
                    route.responses.front().cloned()
                };
                response.ok_or_else(|| {
                    ApiError::Network(format!(
                        "mock route for {} {} has no responses",
                        request.method, request.url
                    ))
                })
            }
            None => Err(ApiError::Network(format!(
                "no scripted response for {} {}",
                request.method, request.url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unscripted_request_fails() {
        let mock = MockTransport::new();
        let err = mock
            .send(ApiRequest::new(Method::Get, "https://api/x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no scripted response"));
    }

    #[tokio::test]
    async fn test_queue_pops_then_sticks() {
        let mock = MockTransport::new();
        mock.enqueue(Method::Get, "/pulls/1", ApiResponse::empty(200))
            .await;
        mock.enqueue(Method::Get, "/pulls/1", ApiResponse::empty(304))
            .await;

        let url = "https://api/repos/o/r/pulls/1";
        let first = mock.send(ApiRequest::new(Method::Get, url)).await.unwrap();
        assert_eq!(first.status, 200);
        for _ in 0..3 {
            let next = mock.send(ApiRequest::new(Method::Get, url)).await.unwrap();
            assert_eq!(next.status, 304);
        }
    }

    #[tokio::test]
    async fn test_method_distinguishes_routes() {
        let mock = MockTransport::new();
        mock.enqueue(Method::Get, "/git/refs/heads/b", ApiResponse::empty(200))
            .await;
        mock.enqueue(Method::Delete, "/git/refs/heads/b", ApiResponse::empty(204))
            .await;

        let url = "https://api/repos/o/r/git/refs/heads/b";
        let get = mock.send(ApiRequest::new(Method::Get, url)).await.unwrap();
        let del = mock
            .send(ApiRequest::new(Method::Delete, url))
            .await
            .unwrap();
        assert_eq!(get.status, 200);
        assert_eq!(del.status, 204);
    }

    #[tokio::test]
    async fn test_request_recording() {
        let mock = MockTransport::new();
        mock.enqueue(
            Method::Post,
            "/git/blobs",
            ApiResponse::json(201, json!({"sha": "d1"})),
        )
        .await;

        let req = ApiRequest::new(Method::Post, "https://api/repos/o/r/git/blobs")
            .with_body(json!({"content": "aGk=", "encoding": "base64"}));
        mock.send(req).await.unwrap();

        assert_eq!(mock.request_count(Method::Post, "/git/blobs").await, 1);
        let sent = mock.requests().await;
        assert_eq!(sent[0].body.as_ref().unwrap()["encoding"], "base64");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mock = MockTransport::new();
        let clone = mock.clone();
        clone
            .enqueue(Method::Get, "/compare/", ApiResponse::empty(200))
            .await;

        mock.send(ApiRequest::new(Method::Get, "https://api/repos/o/r/compare/a...b"))
            .await
            .unwrap();
        assert_eq!(clone.requests().await.len(), 1);
    }
}
