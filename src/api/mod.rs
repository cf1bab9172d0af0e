//! API layer - HTTP endpoint handlers organized by resource.

mod email;
mod health;
mod journeys;
mod models;
mod push;
mod routes;
mod validate;

pub use models::{Recipients, SendResponse};
pub use routes::api_routes;
pub use validate::is_valid_email;
