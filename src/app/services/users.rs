//! User accounts and request authentication.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::app::models::{RegisterUserInput, User};
use crate::app::repository::MemoryRepository;
use crate::app::ApiError;
use crate::error::BoxError;
use crate::registration::{Component, Dependencies};

const MAX_FIELD_LEN: usize = 256;
const MIN_PASSWORD_LEN: usize = 10;

/// The caller identified by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
}

/// Verifies bearer tokens issued elsewhere.
pub trait TokenVerifier: Send + Sync {
    /// `None` when the token is unknown, expired or malformed.
    fn verify(&self, token: &str) -> Option<AuthenticatedUser>;
}

/// Accepts a fixed set of `token -> user id` pairs.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            tokens: pairs.into_iter().collect(),
        }
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<AuthenticatedUser> {
        self.tokens
            .get(token)
            .map(|id| AuthenticatedUser { id: id.clone() })
    }
}

pub struct UsersService {
    repository: Arc<MemoryRepository<User>>,
    verifier: Arc<dyn TokenVerifier>,
}

impl UsersService {
    pub fn new(repository: Arc<MemoryRepository<User>>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { repository, verifier }
    }

    /// Validates and stores a new account.
    ///
    /// Fails with `BadRequest` on invalid fields and with `Conflict` when the
    /// username or email is already taken. The password is checked but never
    /// stored; credentials belong to the token issuer.
    pub fn register(&self, input: RegisterUserInput) -> Result<User, ApiError> {
        let username = input
            .username
            .ok_or_else(|| ApiError::BadRequest("username is required".to_string()))?;
        if !is_valid_username(&username) {
            return Err(ApiError::BadRequest(format!("username {:?} is not valid", username)));
        }

        let email = input
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("email is required".to_string()))?;
        if email.len() > MAX_FIELD_LEN {
            return Err(ApiError::BadRequest(format!("email exceeds {} characters", MAX_FIELD_LEN)));
        }

        let password_len = input.password.as_deref().map_or(0, str::len);
        if !(MIN_PASSWORD_LEN..=MAX_FIELD_LEN).contains(&password_len) {
            return Err(ApiError::BadRequest(format!(
                "password must be between {} and {} characters",
                MIN_PASSWORD_LEN, MAX_FIELD_LEN
            )));
        }

        let user = self
            .repository
            .insert_unique(User::new(username, email), |existing, new| {
                (existing.username == new.username || existing.email == new.email)
                    .then(|| "username or email".to_string())
            })
            .map_err(|_| {
                ApiError::Conflict("The username and/or email address is already registered".to_string())
            })?;

        tracing::info!(user = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    pub fn get(&self) -> Vec<User> {
        self.repository.get()
    }

    pub fn get_by_id(&self, id: &str) -> Option<User> {
        self.repository.get_by_id(id)
    }

    /// Identifies the caller from an `Authorization: Bearer <token>` header.
    ///
    /// A missing header or another scheme is `Unauthorized`; a bearer token
    /// the verifier rejects is `Forbidden`.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<AuthenticatedUser, ApiError> {
        let mut parts = authorization.unwrap_or_default().split(' ');
        let (Some("Bearer"), Some(token)) = (parts.next(), parts.next()) else {
            return Err(ApiError::Unauthorized("Access token invalid or not provided.".to_string()));
        };

        self.verifier.verify(token).ok_or_else(|| {
            tracing::debug!("bearer token rejected");
            ApiError::forbidden()
        })
    }

    pub fn is_resource_owner(&self, owner_id: &str, user: &AuthenticatedUser) -> bool {
        owner_id == user.id
    }
}

#[async_trait]
impl Component for UsersService {
    async fn build(deps: Dependencies) -> Result<Self, BoxError> {
        Ok(UsersService::new(
            deps.get::<MemoryRepository<User>>(0)?,
            deps.get_cloned::<Arc<dyn TokenVerifier>>(1)?,
        ))
    }
}

fn is_valid_username(username: &str) -> bool {
    let mut chars = username.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_letter
        && (3..=MAX_FIELD_LEN).contains(&username.len())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
