use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::email::{send_delayed_email, send_email, send_segment_email};
use super::health::{emails_health, health, journeys_health, notifications_health};
use super::journeys::{create_user, test_connection, trigger_journey};
use super::push::{cancel_push, push_status, send_delayed_push, send_push, send_segment_push};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/notifications", notification_routes())
        .nest("/api/emails", email_routes())
        .nest("/api/journeys", journey_routes())
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(notifications_health))
        .route("/push", post(send_push))
        .route("/push/delayed", post(send_delayed_push))
        .route("/push/segment", post(send_segment_push))
        .route("/push/{id}", get(push_status).delete(cancel_push))
}

fn email_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(emails_health))
        .route("/send", post(send_email))
        .route("/send/delayed", post(send_delayed_email))
        .route("/send/segment", post(send_segment_email))
}

fn journey_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(journeys_health))
        .route("/test-connection", get(test_connection))
        .route("/create-user", post(create_user))
        .route("/trigger-journey", post(trigger_journey))
}
