//! Composition root: registers every component of the backend.

use std::sync::Arc;

use crate::app::controllers::{GamesController, UsersController, WebhooksController};
use crate::app::models::{Game, User, Webhook};
use crate::app::repository::{MemoryRepository, ModelType};
use crate::app::services::{
    GamesService, LinksService, StaticTokenVerifier, TokenVerifier, TracingWebhookSink, UsersService, WebhookSink,
    WebhooksService,
};
use crate::config::AppConfig;
use crate::error::DiResult;
use crate::registration::RegisterOptions;
use crate::registry::Registry;

/// Registration names.
pub mod names {
    pub const CONNECTION_STRING: &str = "ConnectionString";
    pub const TOKEN_VERIFIER: &str = "TokenVerifier";
    pub const WEBHOOK_SINK: &str = "WebhookSink";

    pub const USER_MODEL_TYPE: &str = "UserModelType";
    pub const USER_REPOSITORY: &str = "UserRepositorySingleton";
    pub const USERS_SERVICE: &str = "UsersServiceSingleton";
    pub const USERS_CONTROLLER: &str = "UsersController";

    pub const LINKS_SERVICE: &str = "LinksServiceSingleton";

    pub const GAME_MODEL_TYPE: &str = "GameModelType";
    pub const GAME_REPOSITORY: &str = "GameRepositorySingleton";
    pub const GAMES_SERVICE: &str = "GamesServiceSingleton";
    pub const GAMES_CONTROLLER: &str = "GamesController";

    pub const WEBHOOK_MODEL_TYPE: &str = "WebhookModelType";
    pub const WEBHOOK_REPOSITORY: &str = "WebhookRepositorySingleton";
    pub const WEBHOOKS_SERVICE: &str = "WebhooksServiceSingleton";
    pub const WEBHOOKS_CONTROLLER: &str = "WebhooksController";
}

use names::*;

/// Registers the backend with the default collaborators: tokens from
/// `config.api_tokens` and a logging webhook sink.
///
/// The returned registry is still open so callers may add observers before
/// sealing it.
///
/// # Examples
///
/// ```
/// use quarry::app::{bootstrap, controllers::GamesController, names};
/// use quarry::config::AppConfig;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let container = bootstrap(&AppConfig::default()).unwrap().seal().unwrap();
///
/// let a = container.resolve_as::<GamesController>(names::GAMES_CONTROLLER).await.unwrap();
/// let b = container.resolve_as::<GamesController>(names::GAMES_CONTROLLER).await.unwrap();
/// assert!(!std::sync::Arc::ptr_eq(&a, &b));
/// # });
/// ```
pub fn bootstrap(config: &AppConfig) -> DiResult<Registry> {
    let verifier: Arc<dyn TokenVerifier> = Arc::new(StaticTokenVerifier::new(config.api_tokens.clone()));
    bootstrap_with(config, verifier, Arc::new(TracingWebhookSink))
}

/// Registers the backend with explicit external collaborators.
pub fn bootstrap_with(
    config: &AppConfig,
    verifier: Arc<dyn TokenVerifier>,
    sink: Arc<dyn WebhookSink>,
) -> DiResult<Registry> {
    let mut registry = Registry::new();

    registry
        .register_value(CONNECTION_STRING, config.connection_string.clone())?
        .register_value(TOKEN_VERIFIER, verifier)?
        .register_value(WEBHOOK_SINK, sink)?;

    registry
        .register_value(USER_MODEL_TYPE, ModelType::<User>::new("users"))?
        .register_factory(
            USER_REPOSITORY,
            RegisterOptions::singleton().depends_on([USER_MODEL_TYPE]),
            |deps| Ok(MemoryRepository::new(&*deps.get::<ModelType<User>>(0)?)),
        )?
        .register_component::<UsersService>(
            USERS_SERVICE,
            RegisterOptions::singleton().depends_on([USER_REPOSITORY, TOKEN_VERIFIER]),
        )?
        .register_component::<UsersController>(
            USERS_CONTROLLER,
            RegisterOptions::transient().depends_on([USERS_SERVICE]),
        )?;

    registry.register_component::<LinksService>(LINKS_SERVICE, RegisterOptions::singleton())?;

    registry
        .register_value(GAME_MODEL_TYPE, ModelType::<Game>::new("games"))?
        .register_factory(
            GAME_REPOSITORY,
            RegisterOptions::singleton().depends_on([GAME_MODEL_TYPE]),
            |deps| Ok(MemoryRepository::new(&*deps.get::<ModelType<Game>>(0)?)),
        )?
        .register_component::<GamesService>(
            GAMES_SERVICE,
            RegisterOptions::singleton().depends_on([GAME_REPOSITORY]),
        )?
        .register_component::<GamesController>(
            GAMES_CONTROLLER,
            RegisterOptions::transient().depends_on([
                GAMES_SERVICE,
                WEBHOOKS_SERVICE,
                USERS_SERVICE,
                LINKS_SERVICE,
            ]),
        )?;

    registry
        .register_value(WEBHOOK_MODEL_TYPE, ModelType::<Webhook>::new("webhooks"))?
        .register_factory(
            WEBHOOK_REPOSITORY,
            RegisterOptions::singleton().depends_on([WEBHOOK_MODEL_TYPE]),
            |deps| Ok(MemoryRepository::new(&*deps.get::<ModelType<Webhook>>(0)?)),
        )?
        .register_component::<WebhooksService>(
            WEBHOOKS_SERVICE,
            RegisterOptions::singleton().depends_on([WEBHOOK_REPOSITORY, WEBHOOK_SINK]),
        )?
        .register_component::<WebhooksController>(
            WEBHOOKS_CONTROLLER,
            RegisterOptions::transient().depends_on([WEBHOOKS_SERVICE, USERS_SERVICE, LINKS_SERVICE]),
        )?;

    tracing::debug!(components = registry.len(), "backend registered");
    Ok(registry)
}
