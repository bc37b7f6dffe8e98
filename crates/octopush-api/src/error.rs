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

//! API error types and utilities

use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the remote service
///
/// Transient network and 5xx conditions are retried inside the
/// transport; every variant here is fatal to the current run.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No credential was attached to an outgoing request.
    ///
    /// This is a programming error (missing token in the client
    /// configuration), not a remote failure.
    #[error("no credential attached to request: {0}")]
    AuthMissing(String),

    /// The remote returned a status outside the expected set, after
    /// transport-level retries were exhausted
    #[error("{method} {url} failed with status {status}: {body}")]
    RequestFailed {
        /// HTTP method of the failed request
        method: String,
        /// Full request URL
        url: String,
        /// Response status code
        status: u16,
        /// Response body, for diagnosis
        body: String,
    },

    /// A response that should have been JSON could not be parsed
    #[error("unexpected non-JSON response from {url}: {body}")]
    UnexpectedContentType {
        /// Full request URL
        url: String,
        /// Raw response body, for diagnosis
        body: String,
    },

    /// The transport gave up after exhausting its retry budget
    #[error("network error after retries: {0}")]
    Network(String),
}

impl ApiError {
    /// Create a RequestFailed error from a response
    pub fn request_failed(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        ApiError::RequestFailed {
            method: method.into(),
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Create an UnexpectedContentType error with the offending body
    pub fn unexpected_content_type(url: impl Into<String>, body: impl Into<String>) -> Self {
        ApiError::UnexpectedContentType {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Status code of the failed request, if this is a RequestFailed
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is an AuthMissing error
    pub fn is_auth_missing(&self) -> bool {
        matches!(self, ApiError::AuthMissing(_))
    }

    /// Check if this is a RequestFailed error
    pub fn is_request_failed(&self) -> bool {
        matches!(self, ApiError::RequestFailed { .. })
    }
}
