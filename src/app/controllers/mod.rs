//! Per-request controllers. Each is a transient registration.

pub mod games;
pub mod users;
pub mod webhooks;

pub use games::GamesController;
pub use users::UsersController;
pub use webhooks::WebhooksController;
