//! The REST backend wired together by the container.
//!
//! Layers follow the usual chain: controllers call services, services call
//! repositories, repositories are parameterized by a model type. Every layer
//! is a named registration in [`bootstrap`]; controllers are resolved per
//! request and stay independent of the HTTP framework. They take a
//! [`RequestContext`] and produce an [`ApiResponse`] or an [`ApiError`].

pub mod bootstrap;
pub mod controllers;
#[cfg(feature = "axum-integration")]
pub mod http;
pub mod models;
pub mod repository;
pub mod seed;
pub mod services;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::DiError;
use repository::RepositoryError;

pub use bootstrap::{bootstrap, names};

/// Errors surfaced to API clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError::NotFound("The requested resource was not found.".to_string())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden(
            "The request contained valid data and was understood by the server, but the server is \
             refusing action due to the authenticated user not having the necessary permissions \
             for the resource."
                .to_string(),
        )
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }

    /// JSON body sent to the client.
    pub fn body(&self) -> Value {
        let message = match self {
            // internals are logged, not leaked
            ApiError::Internal(_) => "An unexpected condition was encountered.".to_string(),
            other => other.to_string(),
        };
        json!({ "status_code": self.status(), "message": message })
    }
}

impl From<DiError> for ApiError {
    fn from(err: DiError) -> Self {
        tracing::error!(error = %err, "component resolution failed");
        ApiError::Internal(err.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        tracing::debug!(error = %err, "repository conflict");
        ApiError::Conflict(err.to_string())
    }
}

/// What a controller needs to know about the inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Absolute URL of the resource collection, e.g.
    /// `http://localhost:8091/api/v1/games`
    pub base_url: String,
    /// Raw `Authorization` header
    pub authorization: Option<String>,
}

impl RequestContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, header: impl Into<String>) -> Self {
        self.authorization = Some(header.into());
        self
    }

    /// `base_url/path`, or `base_url` itself when `path` is empty.
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }
}

/// A successful controller result.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Value for the `Location` header
    pub location: Option<String>,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn ok(body: impl Serialize) -> Result<Self, ApiError> {
        Ok(Self {
            status: 200,
            location: None,
            body: Some(to_json(body)?),
        })
    }

    pub fn created(location: Option<String>, body: impl Serialize) -> Result<Self, ApiError> {
        Ok(Self {
            status: 201,
            location,
            body: Some(to_json(body)?),
        })
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            location: None,
            body: None,
        }
    }
}

fn to_json(body: impl Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Body of the API root.
pub fn api_root(base_url: &str) -> Value {
    let base = base_url.trim_end_matches('/');
    json!({
        "Api": "Welcome to this restful API!",
        "availableServices": ["users", "webhooks", "games"],
        "links": [
            format!("{}/users", base),
            format!("{}/webhooks", base),
            format!("{}/games", base),
        ],
    })
}
