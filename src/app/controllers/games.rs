//! `/games` endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::app::models::{Game, GameInput};
use crate::app::services::{AuthenticatedUser, GamesService, Link, LinksService, NewGame, UsersService, WebhooksService};
use crate::app::{ApiError, ApiResponse, RequestContext};
use crate::error::BoxError;
use crate::registration::{Component, Dependencies};

const REQUIRED_FIELDS: [&str; 3] = ["specie", "position", "city"];

pub struct GamesController {
    games: Arc<GamesService>,
    webhooks: Arc<WebhooksService>,
    users: Arc<UsersService>,
    links: Arc<LinksService>,
}

impl GamesController {
    pub fn new(
        games: Arc<GamesService>,
        webhooks: Arc<WebhooksService>,
        users: Arc<UsersService>,
        links: Arc<LinksService>,
    ) -> Self {
        Self {
            games,
            webhooks,
            users,
            links,
        }
    }

    /// Every game, each with a link to itself.
    pub async fn find_all(&self, ctx: &RequestContext) -> Result<ApiResponse, ApiError> {
        let games = self
            .games
            .get()
            .into_iter()
            .map(|game| {
                let link = self.links.create_link(ctx, "game", "GET", &game.id);
                with_links(&game, json!(link))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ApiResponse::ok(games)
    }

    pub async fn find(&self, ctx: &RequestContext, id: &str) -> Result<ApiResponse, ApiError> {
        let game = self.load(id)?;
        let links = self.resource_links(ctx, &game.id, "Self");
        ApiResponse::ok(json!({ "data": game, "links": links }))
    }

    pub async fn create(&self, ctx: &RequestContext, input: GameInput) -> Result<ApiResponse, ApiError> {
        let user = self.users.authenticate(ctx.authorization.as_deref())?;

        let (Some(specie), Some(position), Some(city)) = (input.specie, input.position, input.city) else {
            return Err(missing_fields());
        };
        let game = self.games.insert(NewGame {
            hunter: user.id,
            specie,
            position,
            city,
            weight: input.weight,
            length: input.length,
            image_url: input.image_url,
        });
        tracing::info!(game = %game.id, hunter = %game.hunter, "game created");

        let dispatch = self.webhooks.trigger("game.created", "create", to_value(&game)?);
        tracing::debug!(game = %game.id, subscribers = dispatch.len(), "create event dispatched");

        let links = self.resource_links(ctx, &game.id, "Self");
        ApiResponse::created(Some(ctx.url(&game.id)), json!({ "data": game, "links": links }))
    }

    pub async fn update(&self, ctx: &RequestContext, id: &str, input: GameInput) -> Result<ApiResponse, ApiError> {
        let game = self.load(id)?;
        let user = self.users.authenticate(ctx.authorization.as_deref())?;
        self.authorize(&game, &user)?;

        let body = to_value(&input)?;
        let (Some(specie), Some(position), Some(city)) = (input.specie, input.position, input.city) else {
            return Err(missing_fields());
        };
        self.games
            .update(id, specie, position, city)
            .ok_or_else(ApiError::not_found)?;

        let dispatch = self.webhooks.trigger("game.updated", "update", body);
        tracing::debug!(game = %id, subscribers = dispatch.len(), "update event dispatched");

        let links = vec![
            self.links.create_update_link(ctx, "Self", &REQUIRED_FIELDS, id),
            self.links.create_link(ctx, "game", "GET", id),
            self.links.create_link(ctx, "game", "DELETE", id),
            self.links.create_collection_link(ctx),
        ];
        ApiResponse::ok(json!({ "message": "Game updated successfully", "links": links }))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<ApiResponse, ApiError> {
        let game = self.load(id)?;
        let user = self.users.authenticate(ctx.authorization.as_deref())?;
        self.authorize(&game, &user)?;

        self.games.delete(id).ok_or_else(ApiError::not_found)?;
        tracing::info!(game = %id, "game deleted");
        Ok(ApiResponse::no_content())
    }

    fn load(&self, id: &str) -> Result<Game, ApiError> {
        self.games.get_by_id(id).ok_or_else(ApiError::not_found)
    }

    fn authorize(&self, game: &Game, user: &AuthenticatedUser) -> Result<(), ApiError> {
        if self.users.is_resource_owner(&game.hunter, user) {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }

    fn resource_links(&self, ctx: &RequestContext, id: &str, self_rel: &str) -> Vec<Link> {
        vec![
            self.links.create_link(ctx, self_rel, "GET", id),
            self.links.create_post_link(ctx, "game"),
            self.links.create_update_link(ctx, "game", &REQUIRED_FIELDS, id),
            self.links.create_link(ctx, "game", "DELETE", id),
            self.links.create_collection_link(ctx),
        ]
    }
}

#[async_trait]
impl Component for GamesController {
    async fn build(deps: Dependencies) -> Result<Self, BoxError> {
        Ok(GamesController::new(
            deps.get::<GamesService>(0)?,
            deps.get::<WebhooksService>(1)?,
            deps.get::<UsersService>(2)?,
            deps.get::<LinksService>(3)?,
        ))
    }
}

fn missing_fields() -> ApiError {
    ApiError::BadRequest("All required parameters not supplied.".to_string())
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

fn with_links(game: &Game, links: Value) -> Result<Value, ApiError> {
    let mut value = to_value(game)?;
    if let Value::Object(fields) = &mut value {
        fields.insert("links".to_string(), links);
    }
    Ok(value)
}
