//! The backend driven through its controllers, wired by the composition root.

use async_trait::async_trait;
use parking_lot::Mutex;
use quarry::app::bootstrap::{bootstrap, bootstrap_with};
use quarry::app::controllers::{GamesController, UsersController, WebhooksController};
use quarry::app::models::{GameInput, Position, RegisterUserInput, Webhook, WebhookInput};
use quarry::app::seed::{seed_with, SeedReport, CITIES, SPECIES};
use quarry::app::services::{StaticTokenVerifier, TokenVerifier, UsersService, WebhookSink};
use quarry::app::{names, ApiError, RequestContext};
use quarry::config::AppConfig;
use quarry::{BoxError, Container};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const GAMES_URL: &str = "http://localhost:8091/api/v1/games";
const WEBHOOKS_URL: &str = "http://localhost:8091/api/v1/webhooks";

#[derive(Default)]
struct RecordingSink {
    deliveries: Mutex<Vec<(String, Value)>>,
    notify: Notify,
}

impl RecordingSink {
    /// Waits until at least `count` deliveries have landed.
    async fn wait_for(&self, count: usize) -> Vec<(String, Value)> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let deliveries = self.deliveries.lock();
                    if deliveries.len() >= count {
                        return deliveries.clone();
                    }
                }
                self.notify.notified().await;
            }
        })
        .await
        .expect("webhook deliveries did not arrive")
    }
}

struct StalledSink;

#[async_trait]
impl WebhookSink for StalledSink {
    async fn deliver(&self, _webhook: &Webhook, _payload: &Value) -> Result<(), BoxError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

#[async_trait]
impl WebhookSink for RecordingSink {
    async fn deliver(&self, webhook: &Webhook, payload: &Value) -> Result<(), BoxError> {
        self.deliveries
            .lock()
            .push((webhook.subscriber_url.clone(), payload.clone()));
        self.notify.notify_one();
        Ok(())
    }
}

struct Backend {
    container: Container,
    sink: Arc<RecordingSink>,
}

impl Backend {
    fn new() -> Self {
        let verifier: Arc<dyn TokenVerifier> = Arc::new(StaticTokenVerifier::new([
            ("alice-token".to_string(), "a11ce0000000000000000001".to_string()),
            ("bob-token".to_string(), "b0b000000000000000000002".to_string()),
        ]));
        let sink = Arc::new(RecordingSink::default());
        let container = bootstrap_with(&AppConfig::default(), verifier, sink.clone())
            .unwrap()
            .seal()
            .unwrap();
        Self { container, sink }
    }

    async fn games(&self) -> Arc<GamesController> {
        self.container
            .resolve_as::<GamesController>(names::GAMES_CONTROLLER)
            .await
            .unwrap()
    }

    async fn webhooks(&self) -> Arc<WebhooksController> {
        self.container
            .resolve_as::<WebhooksController>(names::WEBHOOKS_CONTROLLER)
            .await
            .unwrap()
    }
}

fn as_user(url: &str, token: &str) -> RequestContext {
    RequestContext::new(url).with_authorization(format!("Bearer {}", token))
}

fn moose() -> GameInput {
    GameInput {
        specie: Some("Moose".to_string()),
        position: Some(Position {
            latitude: 56.66,
            longitude: 16.36,
        }),
        city: Some("Kalmar".to_string()),
        weight: Some(420.0),
        ..GameInput::default()
    }
}

#[tokio::test]
async fn test_game_lifecycle_with_webhook() {
    let backend = Backend::new();
    let alice = as_user(GAMES_URL, "alice-token");

    let subscribed = backend
        .webhooks()
        .await
        .register(
            &as_user(WEBHOOKS_URL, "bob-token"),
            WebhookInput {
                subscriber_url: Some("http://bob.example/hook".to_string()),
                event: Some("create".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(subscribed.status, 201);

    let created = backend.games().await.create(&alice, moose()).await.unwrap();
    assert_eq!(created.status, 201);
    let body = created.body.unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created.location.as_deref(), Some(format!("{}/{}", GAMES_URL, id).as_str()));
    assert_eq!(body["data"]["hunter"], "a11ce0000000000000000001");
    assert_eq!(body["links"].as_array().unwrap().len(), 5);

    {
        let deliveries = backend.sink.wait_for(1).await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "http://bob.example/hook");
        assert_eq!(deliveries[0].1["event"], "game.created");
        assert_eq!(deliveries[0].1["data"]["id"], id.as_str());
    }

    let listed = backend.games().await.find_all(&RequestContext::new(GAMES_URL)).await.unwrap();
    let games = listed.body.unwrap();
    assert_eq!(games.as_array().unwrap().len(), 1);
    assert_eq!(games[0]["links"]["href"], format!("{}/{}", GAMES_URL, id));

    let mut renamed = moose();
    renamed.specie = Some("Roe deer".to_string());
    let updated = backend.games().await.update(&alice, &id, renamed).await.unwrap();
    assert_eq!(updated.status, 200);
    assert_eq!(updated.body.unwrap()["message"], "Game updated successfully");

    let found = backend.games().await.find(&RequestContext::new(GAMES_URL), &id).await.unwrap();
    assert_eq!(found.body.unwrap()["data"]["specie"], "Roe deer");

    // update subscribers only listen to "update"; bob subscribed to "create"
    assert_eq!(backend.sink.deliveries.lock().len(), 1);

    let deleted = backend.games().await.delete(&alice, &id).await.unwrap();
    assert_eq!(deleted.status, 204);
    assert!(deleted.body.is_none());

    let gone = backend.games().await.find(&RequestContext::new(GAMES_URL), &id).await;
    assert!(matches!(gone, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_game_authorization_rules() {
    let backend = Backend::new();
    let games = backend.games().await;

    let anonymous = games.create(&RequestContext::new(GAMES_URL), moose()).await;
    assert_eq!(anonymous.unwrap_err().status(), 401);

    let bad_token = games.create(&as_user(GAMES_URL, "forged"), moose()).await;
    assert_eq!(bad_token.unwrap_err().status(), 403);

    let created = games.create(&as_user(GAMES_URL, "alice-token"), moose()).await.unwrap();
    let id = created.body.unwrap()["data"]["id"].as_str().unwrap().to_string();

    let by_bob = games.update(&as_user(GAMES_URL, "bob-token"), &id, moose()).await;
    assert!(matches!(by_bob, Err(ApiError::Forbidden(_))));

    let delete_by_bob = games.delete(&as_user(GAMES_URL, "bob-token"), &id).await;
    assert!(matches!(delete_by_bob, Err(ApiError::Forbidden(_))));

    let incomplete = GameInput {
        city: None,
        ..moose()
    };
    let missing = games.update(&as_user(GAMES_URL, "alice-token"), &id, incomplete).await;
    assert!(matches!(missing, Err(ApiError::BadRequest(_))));

    let unknown = games
        .update(&as_user(GAMES_URL, "alice-token"), "ffffffffffffffffffffffff", moose())
        .await;
    assert!(matches!(unknown, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_update_trigger_matches_case_insensitively() {
    let backend = Backend::new();
    let webhooks = backend.webhooks().await;
    webhooks
        .register(
            &as_user(WEBHOOKS_URL, "bob-token"),
            WebhookInput {
                subscriber_url: Some("http://bob.example/updates".to_string()),
                event: Some("UPDATE".to_string()),
            },
        )
        .await
        .unwrap();

    let alice = as_user(GAMES_URL, "alice-token");
    let games = backend.games().await;
    let created = games.create(&alice, moose()).await.unwrap();
    let id = created.body.unwrap()["data"]["id"].as_str().unwrap().to_string();
    assert!(backend.sink.deliveries.lock().is_empty());

    games.update(&alice, &id, moose()).await.unwrap();
    let deliveries = backend.sink.wait_for(1).await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].1["event"], "game.updated");
    assert_eq!(deliveries[0].1["data"]["specie"], "Moose");
}

#[tokio::test]
async fn test_webhook_management() {
    let backend = Backend::new();
    let webhooks = backend.webhooks().await;
    let bob = as_user(WEBHOOKS_URL, "bob-token");

    let options = webhooks.options(&RequestContext::new(WEBHOOKS_URL)).await.unwrap();
    let options = options.body.unwrap();
    assert_eq!(options["availableEvents"], serde_json::json!(["UPDATE", "CREATE"]));
    assert_eq!(options["registerLink"], format!("{}/register", WEBHOOKS_URL));

    let invalid = webhooks
        .register(
            &bob,
            WebhookInput {
                subscriber_url: Some("http://bob.example/hook".to_string()),
                event: Some("delete".to_string()),
            },
        )
        .await;
    assert!(matches!(invalid, Err(ApiError::BadRequest(_))));

    let created = webhooks
        .register(
            &bob,
            WebhookInput {
                subscriber_url: Some("http://bob.example/hook".to_string()),
                event: Some("Create".to_string()),
            },
        )
        .await
        .unwrap();
    let id = created.body.unwrap()["data"]["id"].as_str().unwrap().to_string();

    let empty_update = webhooks.update(&bob, &id, WebhookInput::default()).await;
    assert!(matches!(empty_update, Err(ApiError::BadRequest(_))));

    let by_alice = webhooks
        .update(
            &as_user(WEBHOOKS_URL, "alice-token"),
            &id,
            WebhookInput {
                subscriber_url: Some("http://alice.example/steal".to_string()),
                event: None,
            },
        )
        .await;
    assert!(matches!(by_alice, Err(ApiError::Forbidden(_))));

    let moved = webhooks
        .update(
            &bob,
            &id,
            WebhookInput {
                subscriber_url: Some("http://bob.example/new".to_string()),
                event: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.status, 200);

    let alice_sees = webhooks
        .find_all(&as_user(WEBHOOKS_URL, "alice-token"))
        .await
        .unwrap();
    assert_eq!(alice_sees.body.unwrap().as_array().unwrap().len(), 0);

    let bob_sees = webhooks.find_all(&bob).await.unwrap().body.unwrap();
    assert_eq!(bob_sees[0]["subscriberUrl"], "http://bob.example/new");

    assert_eq!(webhooks.delete(&bob, &id).await.unwrap().status, 204);
    assert!(matches!(webhooks.delete(&bob, &id).await, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_user_registration() {
    let backend = Backend::new();
    let users = backend
        .container
        .resolve_as::<UsersController>(names::USERS_CONTROLLER)
        .await
        .unwrap();
    let ctx = RequestContext::new("http://localhost:8091/api/v1/users");

    let input = || RegisterUserInput {
        username: Some("hunter_1".to_string()),
        password: Some("a long enough password".to_string()),
        email: Some("hunter@example.com".to_string()),
    };

    let created = users.register(&ctx, input()).await.unwrap();
    assert_eq!(created.status, 201);
    assert_eq!(created.body.unwrap()["id"].as_str().unwrap().len(), 24);

    let duplicate = users.register(&ctx, input()).await.unwrap_err();
    assert_eq!(duplicate.status(), 409);

    let options = users.options(&ctx).await.unwrap().body.unwrap();
    assert_eq!(options["registerLink"], "http://localhost:8091/api/v1/users/register");
}

#[tokio::test]
async fn test_stalled_subscriber_does_not_block_requests() {
    let verifier: Arc<dyn TokenVerifier> = Arc::new(StaticTokenVerifier::new([(
        "alice-token".to_string(),
        "a11ce0000000000000000001".to_string(),
    )]));
    let container = bootstrap_with(&AppConfig::default(), verifier, Arc::new(StalledSink))
        .unwrap()
        .seal()
        .unwrap();
    let alice = as_user(GAMES_URL, "alice-token");

    let webhooks = container
        .resolve_as::<WebhooksController>(names::WEBHOOKS_CONTROLLER)
        .await
        .unwrap();
    for event in ["create", "update"] {
        webhooks
            .register(
                &as_user(WEBHOOKS_URL, "alice-token"),
                WebhookInput {
                    subscriber_url: Some("http://slow.example/hook".to_string()),
                    event: Some(event.to_string()),
                },
            )
            .await
            .unwrap();
    }

    let games = container
        .resolve_as::<GamesController>(names::GAMES_CONTROLLER)
        .await
        .unwrap();
    let created = tokio::time::timeout(Duration::from_secs(1), games.create(&alice, moose()))
        .await
        .expect("create waited on a subscriber")
        .unwrap();
    assert_eq!(created.status, 201);

    let id = created.body.unwrap()["data"]["id"].as_str().unwrap().to_string();
    let updated = tokio::time::timeout(Duration::from_secs(1), games.update(&alice, &id, moose()))
        .await
        .expect("update waited on a subscriber")
        .unwrap();
    assert_eq!(updated.status, 200);
}

#[tokio::test]
async fn test_seeding_inserts_demo_users_and_games() {
    let container = bootstrap(&AppConfig::default()).unwrap().seal().unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let report = seed_with(&container, 25, &mut rng).await.unwrap();
    assert_eq!(report, SeedReport { users: 2, games: 25 });

    let games = container
        .resolve_as::<GamesController>(names::GAMES_CONTROLLER)
        .await
        .unwrap();
    let listed = games.find_all(&RequestContext::new(GAMES_URL)).await.unwrap().body.unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 25);

    let users = container
        .resolve_as::<UsersService>(names::USERS_SERVICE)
        .await
        .unwrap()
        .get();
    for game in listed {
        assert!(SPECIES.contains(&game["specie"].as_str().unwrap()));
        assert!(CITIES.contains(&game["city"].as_str().unwrap()));
        let latitude = game["position"]["latitude"].as_f64().unwrap();
        assert!((55.0..69.0).contains(&latitude));
        assert!(users.iter().any(|u| u.id == game["hunter"].as_str().unwrap()));
    }

    // demo users already exist; only games are added
    let again = seed_with(&container, 5, &mut rng).await.unwrap();
    assert_eq!(again, SeedReport { users: 0, games: 5 });
}
