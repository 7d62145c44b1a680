//! `/users` endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::app::models::RegisterUserInput;
use crate::app::services::UsersService;
use crate::app::{ApiError, ApiResponse, RequestContext};
use crate::error::BoxError;
use crate::registration::{Component, Dependencies};

pub struct UsersController {
    users: Arc<UsersService>,
}

impl UsersController {
    pub fn new(users: Arc<UsersService>) -> Self {
        Self { users }
    }

    pub async fn options(&self, ctx: &RequestContext) -> Result<ApiResponse, ApiError> {
        ApiResponse::ok(json!({
            "users": "welcome to the users service",
            "registerLink": ctx.url("register"),
        }))
    }

    pub async fn register(&self, _ctx: &RequestContext, input: RegisterUserInput) -> Result<ApiResponse, ApiError> {
        let user = self.users.register(input)?;
        ApiResponse::created(None, json!({ "id": user.id }))
    }
}

#[async_trait]
impl Component for UsersController {
    async fn build(deps: Dependencies) -> Result<Self, BoxError> {
        Ok(UsersController::new(deps.get::<UsersService>(0)?))
    }
}
