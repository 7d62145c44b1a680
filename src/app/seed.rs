//! Demo data for a fresh store.
//!
//! Seeding goes through the resolved singleton services, so the records are
//! validated exactly like those created over HTTP.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::app::bootstrap::names;
use crate::app::models::{Position, RegisterUserInput};
use crate::app::services::{GamesService, NewGame, UsersService};
use crate::app::ApiError;
use crate::container::Container;

/// Demo accounts as `(username, password, email)`.
pub const DEMO_USERS: [(&str, &str, &str); 2] = [
    ("User-1", "User-1-user", "User-1-user@example.com"),
    ("User-2", "User-2-user", "User-2-user@example.com"),
];

pub const SPECIES: [&str; 17] = [
    "Moose",
    "Red deer",
    "Fallow deer",
    "Roe deer",
    "Wild boar",
    "Blue hare",
    "Brown hare",
    "Rabbit",
    "Beaver",
    "Muskrat",
    "Brown bear",
    "Red fox",
    "American mink",
    "Polecat",
    "Pine marten",
    "Badger",
    "Pheasant",
];

pub const CITIES: [&str; 17] = [
    "Blekinge län",
    "Dalarnas län",
    "Gotlands län",
    "Gävleborgs län",
    "Hallands län",
    "Jämtlands län",
    "Jönköpings län",
    "Kalmar län",
    "Kronobergs län",
    "Norrbottens län",
    "Skåne län",
    "Stockholms län",
    "Södermanlands län",
    "Uppsala län",
    "Värmlands län",
    "Västerbottens län",
    "Västernorrlands län",
];

/// What a seeding run inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub users: usize,
    pub games: usize,
}

/// Registers the demo users and generates `games` random games.
pub async fn seed(container: &Container, games: usize) -> Result<SeedReport, ApiError> {
    let (users_service, games_service) = services(container).await?;
    populate(&users_service, &games_service, games, &mut rand::thread_rng())
}

/// [`seed`] with a caller-supplied random source.
pub async fn seed_with<R: Rng + Send>(container: &Container, games: usize, rng: &mut R) -> Result<SeedReport, ApiError> {
    let (users_service, games_service) = services(container).await?;
    populate(&users_service, &games_service, games, rng)
}

async fn services(container: &Container) -> Result<(Arc<UsersService>, Arc<GamesService>), ApiError> {
    let users = container.resolve_as::<UsersService>(names::USERS_SERVICE).await?;
    let games = container.resolve_as::<GamesService>(names::GAMES_SERVICE).await?;
    Ok((users, games))
}

fn populate<R: Rng + ?Sized>(
    users: &UsersService,
    games: &GamesService,
    count: usize,
    rng: &mut R,
) -> Result<SeedReport, ApiError> {
    let mut report = SeedReport::default();

    for (username, password, email) in DEMO_USERS {
        let input = RegisterUserInput {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            email: Some(email.to_string()),
        };
        match users.register(input) {
            Ok(_) => report.users += 1,
            Err(ApiError::Conflict(_)) => tracing::debug!(username, "demo user already present"),
            Err(e) => return Err(e),
        }
    }

    let hunters = users.get();
    if hunters.is_empty() {
        tracing::warn!("no users to own seeded games");
        return Ok(report);
    }

    for _ in 0..count {
        let hunter = &hunters[rng.gen_range(0..hunters.len())];
        games.insert(NewGame {
            hunter: hunter.id.clone(),
            specie: pick(&SPECIES, rng),
            position: Position {
                latitude: rng.gen_range(55.0..69.0),
                longitude: rng.gen_range(11.0..24.0),
            },
            city: pick(&CITIES, rng),
            weight: Some(rng.gen_range(10.0..500.0)),
            length: Some(rng.gen_range(0.5..3.0)),
            image_url: Some(format!("https://example.com/{}.jpg", pick(&SPECIES, rng))),
        });
        report.games += 1;
    }

    tracing::info!(users = report.users, games = report.games, "seed data inserted");
    Ok(report)
}

fn pick<R: Rng + ?Sized>(values: &[&str], rng: &mut R) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}
