//! Hypermedia links attached to API responses.

use async_trait::async_trait;
use serde::Serialize;

use crate::app::RequestContext;
use crate::error::BoxError;
use crate::registration::{Component, Dependencies};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub rel: String,
    pub method: String,
    pub href: String,
    /// Fields a client must send with this request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_fields: Option<Vec<String>>,
}

/// Builds [`Link`]s relative to the collection URL of the current request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinksService;

impl LinksService {
    pub fn new() -> Self {
        Self
    }

    pub fn create_link(&self, ctx: &RequestContext, rel: &str, method: &str, path: &str) -> Link {
        Link {
            rel: rel.to_string(),
            method: method.to_string(),
            href: ctx.url(path),
            required_fields: None,
        }
    }

    pub fn create_post_link(&self, ctx: &RequestContext, rel: &str) -> Link {
        self.create_link(ctx, rel, "POST", "")
    }

    pub fn create_update_link(&self, ctx: &RequestContext, rel: &str, required: &[&str], id: &str) -> Link {
        Link {
            required_fields: Some(required.iter().map(|f| f.to_string()).collect()),
            ..self.create_link(ctx, rel, "PUT", id)
        }
    }

    pub fn create_collection_link(&self, ctx: &RequestContext) -> Link {
        self.create_link(ctx, "collection", "GET", "")
    }
}

#[async_trait]
impl Component for LinksService {
    async fn build(_deps: Dependencies) -> Result<Self, BoxError> {
        Ok(LinksService)
    }
}
