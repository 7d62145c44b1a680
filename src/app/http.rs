//! Axum routing for the backend.
//!
//! Every handler resolves its controller from the sealed [`Container`] held in
//! the router state, so controllers are built per request while the services
//! behind them are shared singletons.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

use crate::app::controllers::{GamesController, UsersController, WebhooksController};
use crate::app::models::{GameInput, RegisterUserInput, WebhookInput};
use crate::app::names;
use crate::app::{api_root, ApiError, ApiResponse, RequestContext};
use crate::container::Container;

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    container: Container,
    base_path: Arc<str>,
}

impl AppState {
    pub fn new(container: Container, base_path: &str) -> Self {
        Self {
            container,
            base_path: Arc::from(base_path.trim_end_matches('/')),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    fn base_url(&self, headers: &HeaderMap) -> String {
        let host = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");
        format!("http://{}{}", host, self.base_path)
    }

    fn context(&self, headers: &HeaderMap, resource: &str) -> RequestContext {
        let ctx = RequestContext::new(format!("{}/{}", self.base_url(headers), resource));
        match headers.get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()) {
            Some(auth) => ctx.with_authorization(auth),
            None => ctx,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("container", &self.container)
            .field("base_path", &self.base_path)
            .finish()
    }
}

/// Controllers that handlers can extract by registration name.
pub trait NamedController: Send + Sync + 'static {
    const NAME: &'static str;
}

impl NamedController for GamesController {
    const NAME: &'static str = names::GAMES_CONTROLLER;
}

impl NamedController for UsersController {
    const NAME: &'static str = names::USERS_CONTROLLER;
}

impl NamedController for WebhooksController {
    const NAME: &'static str = names::WEBHOOKS_CONTROLLER;
}

/// Extractor resolving a fresh controller for the current request
pub struct Controller<T>(pub Arc<T>);

#[async_trait]
impl<T: NamedController> FromRequestParts<AppState> for Controller<T> {
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let controller = state.container.resolve_as::<T>(T::NAME).await?;
        Ok(Controller(controller))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = match self.body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        };
        if let Some(location) = self.location.and_then(|l| HeaderValue::from_str(&l).ok()) {
            response.headers_mut().insert(header::LOCATION, location);
        }
        response
    }
}

type HandlerResult = Result<ApiResponse, ApiError>;

/// Builds the API router mounted under `base_path`.
pub fn router(container: Container, base_path: &str) -> Router {
    let state = AppState::new(container, base_path);

    let api = Router::new()
        .route("/", get(root))
        .route("/games", get(games_find_all).post(games_create))
        .route("/games/:id", get(games_find).put(games_update).delete(games_delete))
        .route("/users", get(users_options))
        .route("/users/register", post(users_register))
        .route("/webhooks", get(webhooks_options))
        .route("/webhooks/register", post(webhooks_register))
        .route("/webhooks/subscriptions", get(webhooks_find_all))
        .route("/webhooks/:id", put(webhooks_update).delete(webhooks_delete))
        .fallback(not_found);

    let router = if state.base_path.is_empty() {
        api
    } else {
        let base_path = state.base_path.to_string();
        Router::new().nest(&base_path, api)
    };
    router.with_state(state)
}

async fn root(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    Json(api_root(&state.base_url(&headers)))
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

async fn games_find_all(
    State(state): State<AppState>,
    headers: HeaderMap,
    Controller(games): Controller<GamesController>,
) -> HandlerResult {
    games.find_all(&state.context(&headers, "games")).await
}

async fn games_find(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Controller(games): Controller<GamesController>,
) -> HandlerResult {
    games.find(&state.context(&headers, "games"), &id).await
}

async fn games_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Controller(games): Controller<GamesController>,
    Json(input): Json<GameInput>,
) -> HandlerResult {
    games.create(&state.context(&headers, "games"), input).await
}

async fn games_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Controller(games): Controller<GamesController>,
    Json(input): Json<GameInput>,
) -> HandlerResult {
    games.update(&state.context(&headers, "games"), &id, input).await
}

async fn games_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Controller(games): Controller<GamesController>,
) -> HandlerResult {
    games.delete(&state.context(&headers, "games"), &id).await
}

async fn users_options(
    State(state): State<AppState>,
    headers: HeaderMap,
    Controller(users): Controller<UsersController>,
) -> HandlerResult {
    users.options(&state.context(&headers, "users")).await
}

async fn users_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Controller(users): Controller<UsersController>,
    Json(input): Json<RegisterUserInput>,
) -> HandlerResult {
    users.register(&state.context(&headers, "users"), input).await
}

async fn webhooks_options(
    State(state): State<AppState>,
    headers: HeaderMap,
    Controller(webhooks): Controller<WebhooksController>,
) -> HandlerResult {
    webhooks.options(&state.context(&headers, "webhooks")).await
}

async fn webhooks_find_all(
    State(state): State<AppState>,
    headers: HeaderMap,
    Controller(webhooks): Controller<WebhooksController>,
) -> HandlerResult {
    webhooks.find_all(&state.context(&headers, "webhooks")).await
}

async fn webhooks_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Controller(webhooks): Controller<WebhooksController>,
    Json(input): Json<WebhookInput>,
) -> HandlerResult {
    webhooks.register(&state.context(&headers, "webhooks"), input).await
}

async fn webhooks_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Controller(webhooks): Controller<WebhooksController>,
    Json(input): Json<WebhookInput>,
) -> HandlerResult {
    webhooks.update(&state.context(&headers, "webhooks"), &id, input).await
}

async fn webhooks_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Controller(webhooks): Controller<WebhooksController>,
) -> HandlerResult {
    webhooks.delete(&state.context(&headers, "webhooks"), &id).await
}
