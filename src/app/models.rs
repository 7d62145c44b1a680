//! Documents stored by the backend.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creates a fresh 24-hex-digit document id.
///
/// The first 8 digits encode the creation time in seconds, the remaining 16
/// a process-wide counter, so ids sort by creation.
pub fn new_object_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    let seconds = Utc::now().timestamp().max(0) as u32;
    let sequence = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:08x}{:016x}", seconds, sequence)
}

/// Checks that `id` looks like a document id.
pub fn is_object_id(id: &str) -> bool {
    id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Common bookkeeping for stored documents.
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// Called by the store on insert with a fresh id and timestamp.
    fn assign(&mut self, id: String, now: DateTime<Utc>);

    /// Called by the store after every update.
    fn touch(&mut self, now: DateTime<Utc>);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            username: username.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// A catch reported by a hunter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    /// Id of the owning user
    pub hunter: String,
    pub specie: String,
    pub position: Position,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a game.
///
/// Every field is optional on the wire; the controller decides which ones are
/// required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInput {
    pub specie: Option<String>,
    pub position: Option<Position>,
    pub city: Option<String>,
    pub weight: Option<f64>,
    pub length: Option<f64>,
    pub image_url: Option<String>,
}

/// A subscription to game events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub subscriber_id: String,
    pub subscriber_url: String,
    /// `CREATE` or `UPDATE`, as supplied by the subscriber
    pub event: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookInput {
    pub subscriber_url: Option<String>,
    pub event: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterUserInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

macro_rules! impl_document {
    ($($ty:ty),*) => {
        $(
            impl Document for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn assign(&mut self, id: String, now: DateTime<Utc>) {
                    self.id = id;
                    self.created_at = now;
                    self.updated_at = now;
                }

                fn touch(&mut self, now: DateTime<Utc>) {
                    self.updated_at = now;
                }
            }
        )*
    };
}

impl_document!(User, Game, Webhook);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids_are_unique_hex() {
        let a = new_object_id();
        let b = new_object_id();
        assert!(is_object_id(&a));
        assert!(is_object_id(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_game_serializes_camel_case_without_empty_optionals() {
        let now = Utc::now();
        let game = Game {
            id: new_object_id(),
            hunter: new_object_id(),
            specie: "Moose".to_string(),
            position: Position { latitude: 56.6, longitude: 16.3 },
            city: "Kalmar".to_string(),
            weight: None,
            length: Some(2.1),
            image_url: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&game).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("weight").is_none());
        assert_eq!(json["position"]["latitude"], 56.6);
    }
}
