//! Webhook subscriptions and event delivery.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::app::models::Webhook;
use crate::app::repository::MemoryRepository;
use crate::error::BoxError;
use crate::registration::{Component, Dependencies};

/// Events a subscriber may register for.
pub const AVAILABLE_EVENTS: [&str; 2] = ["UPDATE", "CREATE"];

/// Case-insensitive check against [`AVAILABLE_EVENTS`].
pub fn is_valid_event(event: &str) -> bool {
    AVAILABLE_EVENTS.iter().any(|e| e.eq_ignore_ascii_case(event))
}

/// Delivers an event payload to a subscriber.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn deliver(&self, webhook: &Webhook, payload: &Value) -> Result<(), BoxError>;
}

/// Records deliveries as tracing events instead of performing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWebhookSink;

#[async_trait]
impl WebhookSink for TracingWebhookSink {
    async fn deliver(&self, webhook: &Webhook, payload: &Value) -> Result<(), BoxError> {
        tracing::info!(
            webhook = %webhook.id,
            url = %webhook.subscriber_url,
            event = %payload["event"],
            "webhook delivery"
        );
        Ok(())
    }
}

pub struct WebhooksService {
    repository: Arc<MemoryRepository<Webhook>>,
    sink: Arc<dyn WebhookSink>,
}

impl WebhooksService {
    pub fn new(repository: Arc<MemoryRepository<Webhook>>, sink: Arc<dyn WebhookSink>) -> Self {
        Self { repository, sink }
    }

    pub fn get(&self) -> Vec<Webhook> {
        self.repository.get()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Webhook> {
        self.repository.get_by_id(id)
    }

    pub fn insert(&self, subscriber_id: String, subscriber_url: String, event: String) -> Webhook {
        let now = Utc::now();
        self.repository.insert(Webhook {
            id: String::new(),
            subscriber_id,
            subscriber_url,
            event,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_url(&self, id: &str, subscriber_url: String) -> Option<Webhook> {
        self.repository.update(id, |webhook| webhook.subscriber_url = subscriber_url)
    }

    pub fn delete(&self, id: &str) -> Option<Webhook> {
        self.repository.delete(id)
    }

    /// Sends `{ event, data }` to every subscription whose event matches
    /// `method`, ignoring case.
    ///
    /// Each delivery runs on its own task so the caller never waits on a
    /// subscriber. Failures are logged and never reach the caller; the
    /// returned [`Dispatch`] may be dropped or awaited.
    pub fn trigger(&self, event: &str, method: &str, data: Value) -> Dispatch {
        let payload = Arc::new(json!({ "event": event, "data": data }));

        let handles = self
            .repository
            .get()
            .into_iter()
            .filter(|w| w.event.eq_ignore_ascii_case(method))
            .map(|webhook| {
                let sink = self.sink.clone();
                let payload = payload.clone();
                let event = event.to_string();
                tokio::spawn(async move {
                    match sink.deliver(&webhook, &payload).await {
                        Ok(()) => {
                            tracing::debug!(webhook = %webhook.id, %event, "webhook triggered");
                            true
                        }
                        Err(e) => {
                            tracing::warn!(webhook = %webhook.id, %event, error = %e, "webhook delivery failed");
                            false
                        }
                    }
                })
            })
            .collect();

        Dispatch { handles }
    }
}

/// Deliveries started by [`WebhooksService::trigger`].
///
/// Dropping it detaches the deliveries; they still run to completion.
#[derive(Debug)]
pub struct Dispatch {
    handles: Vec<JoinHandle<bool>>,
}

impl Dispatch {
    /// Number of deliveries started.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every delivery and returns how many succeeded.
    pub async fn delivered(self) -> usize {
        let mut delivered = 0;
        for handle in self.handles {
            match handle.await {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(error = %e, "webhook delivery task aborted"),
            }
        }
        delivered
    }
}

#[async_trait]
impl Component for WebhooksService {
    async fn build(deps: Dependencies) -> Result<Self, BoxError> {
        Ok(WebhooksService::new(
            deps.get::<MemoryRepository<Webhook>>(0)?,
            deps.get_cloned::<Arc<dyn WebhookSink>>(1)?,
        ))
    }
}
