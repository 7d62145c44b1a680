//! `/webhooks` endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::app::models::{Webhook, WebhookInput};
use crate::app::services::webhooks::{is_valid_event, AVAILABLE_EVENTS};
use crate::app::services::{AuthenticatedUser, LinksService, UsersService, WebhooksService};
use crate::app::{ApiError, ApiResponse, RequestContext};
use crate::error::BoxError;
use crate::registration::{Component, Dependencies};

const REQUIRED_FIELDS: [&str; 2] = ["subscriberUrl", "event"];

pub struct WebhooksController {
    webhooks: Arc<WebhooksService>,
    users: Arc<UsersService>,
    links: Arc<LinksService>,
}

impl WebhooksController {
    pub fn new(webhooks: Arc<WebhooksService>, users: Arc<UsersService>, links: Arc<LinksService>) -> Self {
        Self { webhooks, users, links }
    }

    pub async fn options(&self, ctx: &RequestContext) -> Result<ApiResponse, ApiError> {
        ApiResponse::ok(json!({
            "webhooks": "welcome to the webhooks service",
            "availableEvents": AVAILABLE_EVENTS,
            "registerLink": ctx.url("register"),
            "links": [
                self.links.create_link(ctx, "Self", "GET", ""),
                self.links.create_link(ctx, "webhook", "POST", "register"),
            ],
        }))
    }

    /// The caller's own subscriptions.
    pub async fn find_all(&self, ctx: &RequestContext) -> Result<ApiResponse, ApiError> {
        let user = self.users.authenticate(ctx.authorization.as_deref())?;
        let mine: Vec<Webhook> = self
            .webhooks
            .get()
            .into_iter()
            .filter(|w| self.users.is_resource_owner(&w.subscriber_id, &user))
            .collect();
        ApiResponse::ok(mine)
    }

    pub async fn register(&self, ctx: &RequestContext, input: WebhookInput) -> Result<ApiResponse, ApiError> {
        let user = self.users.authenticate(ctx.authorization.as_deref())?;

        let subscriber_url = input
            .subscriber_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("subscriberUrl is required".to_string()))?;
        let event = input
            .event
            .filter(|event| is_valid_event(event))
            .ok_or_else(|| {
                ApiError::BadRequest(r#"Event must be either "UPDATE" or "CREATE" (case-insensitive)"#.to_string())
            })?;

        let webhook = self.webhooks.insert(user.id, subscriber_url, event);
        tracing::info!(webhook = %webhook.id, event = %webhook.event, "webhook registered");

        let links = vec![
            self.links.create_link(ctx, "self", "POST", "register"),
            self.links.create_update_link(ctx, "webhook", &REQUIRED_FIELDS, &webhook.id),
            self.links.create_link(ctx, "webhook", "DELETE", &webhook.id),
            self.links.create_collection_link(ctx),
        ];
        ApiResponse::created(Some(ctx.url(&webhook.id)), json!({ "data": webhook, "links": links }))
    }

    pub async fn update(&self, ctx: &RequestContext, id: &str, input: WebhookInput) -> Result<ApiResponse, ApiError> {
        let webhook = self.load(id)?;
        let user = self.users.authenticate(ctx.authorization.as_deref())?;
        self.authorize(&webhook, &user)?;

        let subscriber_url = input
            .subscriber_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("Required parameter is not supplied.".to_string()))?;
        self.webhooks
            .update_url(id, subscriber_url)
            .ok_or_else(ApiError::not_found)?;

        let links = vec![
            self.links.create_update_link(ctx, "Self", &REQUIRED_FIELDS, id),
            self.links.create_link(ctx, "webhook", "POST", "register"),
            self.links.create_link(ctx, "webhook", "DELETE", id),
            self.links.create_collection_link(ctx),
        ];
        ApiResponse::ok(json!({ "message": "webhook is updated successfully", "links": links }))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<ApiResponse, ApiError> {
        let webhook = self.load(id)?;
        let user = self.users.authenticate(ctx.authorization.as_deref())?;
        self.authorize(&webhook, &user)?;

        self.webhooks.delete(id).ok_or_else(ApiError::not_found)?;
        Ok(ApiResponse::no_content())
    }

    fn load(&self, id: &str) -> Result<Webhook, ApiError> {
        self.webhooks.get_by_id(id).ok_or_else(ApiError::not_found)
    }

    fn authorize(&self, webhook: &Webhook, user: &AuthenticatedUser) -> Result<(), ApiError> {
        if self.users.is_resource_owner(&webhook.subscriber_id, user) {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }
}

#[async_trait]
impl Component for WebhooksController {
    async fn build(deps: Dependencies) -> Result<Self, BoxError> {
        Ok(WebhooksController::new(
            deps.get::<WebhooksService>(0)?,
            deps.get::<UsersService>(1)?,
            deps.get::<LinksService>(2)?,
        ))
    }
}
