//! Game records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::app::models::{Game, Position};
use crate::app::repository::MemoryRepository;
use crate::error::BoxError;
use crate::registration::{Component, Dependencies};

/// Fields accepted when creating a game.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub hunter: String,
    pub specie: String,
    pub position: Position,
    pub city: String,
    pub weight: Option<f64>,
    pub length: Option<f64>,
    pub image_url: Option<String>,
}

/// CRUD over the game collection.
pub struct GamesService {
    repository: Arc<MemoryRepository<Game>>,
}

impl GamesService {
    pub fn new(repository: Arc<MemoryRepository<Game>>) -> Self {
        Self { repository }
    }

    pub fn get(&self) -> Vec<Game> {
        self.repository.get()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Game> {
        self.repository.get_by_id(id)
    }

    pub fn insert(&self, game: NewGame) -> Game {
        let now = Utc::now();
        self.repository.insert(Game {
            id: String::new(),
            hunter: game.hunter,
            specie: game.specie,
            position: game.position,
            city: game.city,
            weight: game.weight,
            length: game.length,
            image_url: game.image_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the required fields of a game.
    pub fn update(&self, id: &str, specie: String, position: Position, city: String) -> Option<Game> {
        self.repository.update(id, |game| {
            game.specie = specie;
            game.position = position;
            game.city = city;
        })
    }

    pub fn delete(&self, id: &str) -> Option<Game> {
        self.repository.delete(id)
    }
}

#[async_trait]
impl Component for GamesService {
    async fn build(deps: Dependencies) -> Result<Self, BoxError> {
        Ok(GamesService::new(deps.get::<MemoryRepository<Game>>(0)?))
    }
}
