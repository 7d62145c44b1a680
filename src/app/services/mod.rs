//! Business services, one per resource plus link building.

pub mod games;
pub mod links;
pub mod users;
pub mod webhooks;

pub use games::{GamesService, NewGame};
pub use links::{Link, LinksService};
pub use users::{AuthenticatedUser, StaticTokenVerifier, TokenVerifier, UsersService};
pub use webhooks::{Dispatch, TracingWebhookSink, WebhookSink, WebhooksService};
